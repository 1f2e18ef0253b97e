//! Integration tests for the StatusApp → outbox / scheduler / decoder
//! pipeline, driven through the same event loop the watch runs.

use smartstatus::app::commands::Button;
use smartstatus::app::events::{AppEvent, VibePattern};
use smartstatus::appointment::LocalTime;
use smartstatus::config::SyncConfig;
use smartstatus::events::Event;
use smartstatus::link::LinkState;
use smartstatus::protocol::keys;
use smartstatus::protocol::{Dictionary, ScreenId};
use smartstatus::scheduler::Category;
use smartstatus::TransportError;

use crate::mock_watch::Harness;

fn interval_msg(key: u32, seconds: i32) -> Dictionary {
    let mut msg = Dictionary::new();
    msg.write_int32(key, seconds).unwrap();
    msg
}

fn cstring_msg(key: u32, text: &str) -> Dictionary {
    let mut msg = Dictionary::new();
    msg.write_cstring(key, text).unwrap();
    msg
}

// ── QA-1: start-up and sequence numbering ────────────────────

#[test]
fn start_announces_status_screen_with_first_sequence() {
    let mut h = Harness::started();

    assert_eq!(h.watch.sent.len(), 1);
    let first = &h.watch.sent[0];
    assert_eq!(first.iter().next().map(|t| t.key), Some(keys::SEQUENCE_NUMBER));
    assert_eq!(first.find_i32(keys::SEQUENCE_NUMBER), Some(1));
    assert_eq!(first.find_i32(keys::SCREEN_ENTER), Some(0));
    assert_eq!(h.sink.events[0], AppEvent::Started);

    h.ack();
    assert_eq!(h.app.current_screen(), Some(ScreenId::StatusScreen));
    assert_eq!(h.app.display().status, "Ok");
    assert!(h.sink.events.contains(&AppEvent::LinkChanged {
        from: LinkState::Disconnected,
        to: LinkState::Connected,
    }));
}

#[test]
fn sequence_increments_per_send() {
    let mut h = Harness::started();
    h.ack();
    h.handle(Event::Button(Button::Up));
    h.ack();
    h.handle(Event::Button(Button::Down));
    h.ack();
    assert_eq!(h.watch.sequence_numbers(), vec![1, 2, 3]);
}

#[test]
fn second_send_while_in_flight_is_noop() {
    let mut h = Harness::started();
    h.ack();

    h.handle(Event::Button(Button::Up));
    h.handle(Event::Button(Button::Down));

    assert_eq!(h.watch.sent.len(), 2);
    assert_eq!(h.app.last_sequence(), 2);
    assert_eq!(h.watch.sent_with(keys::VOLUME_UP).len(), 1);
    assert!(h.watch.sent_with(keys::VOLUME_DOWN).is_empty());
}

#[test]
fn long_select_finds_phone() {
    let mut h = Harness::started();
    h.ack();
    h.handle(Event::Button(Button::SelectLong));
    assert_eq!(h.watch.last_sent().unwrap().find_i32(keys::FIND_PHONE), Some(-1));
}

// ── QA-2: refresh timers ─────────────────────────────────────

#[test]
fn weather_interval_update_fires_thirty_seconds_later() {
    let mut h = Harness::started_with(SyncConfig {
        weather_interval_ms: 60_000,
        ..Harness::quiet_config()
    });
    h.ack();

    h.advance_to(12_345);
    h.receive(interval_msg(keys::STATUS_UPDATE_WEATHER, 30));
    assert_eq!(h.app.scheduler().deadline(Category::Weather), Some(42_345));

    h.advance_to(42_344);
    assert_eq!(h.watch.screen_enters(1), 0);

    // Not on the weather screen yet: the switch goes out first and the
    // request follows its acknowledgement.
    h.advance_to(42_345);
    assert_eq!(h.watch.screen_enters(1), 1);
    assert!(h.watch.sent_with(keys::STATUS_UPDATE_WEATHER).is_empty());
    h.ack();
    assert_eq!(h.app.current_screen(), Some(ScreenId::WeatherApp));
    assert_eq!(h.watch.sent_with(keys::STATUS_UPDATE_WEATHER).len(), 1);
    h.ack();

    h.advance_to(72_345);
    assert_eq!(h.watch.sent_with(keys::STATUS_UPDATE_WEATHER).len(), 2);
    assert_eq!(h.watch.screen_enters(1), 1);
}

#[test]
fn weather_refreshes_after_music_returns_to_status_screen() {
    let mut h = Harness::started_with(SyncConfig {
        weather_interval_ms: 60_000,
        music_interval_ms: 20_000,
        ..Harness::quiet_config()
    });
    h.ack();

    for t in [20_000, 40_000, 60_000, 80_000, 100_000, 120_000] {
        h.advance_to(t);
        while h.app.is_sending() {
            h.ack();
        }
    }

    assert_eq!(h.watch.sent_with(keys::STATUS_UPDATE_WEATHER).len(), 2);
    assert_eq!(h.watch.screen_enters(1), 2);
}

#[test]
fn full_queue_does_not_lose_a_timer() {
    let mut h = Harness::started_with(SyncConfig {
        music_interval_ms: 5_000,
        ..Harness::quiet_config()
    });
    h.ack();

    while h.queue.push(Event::WatchBattery(80)) {}
    h.watch.now_ms = 5_000;
    h.app.poll_timers(5_000, &mut h.queue);
    while let Some(event) = h.queue.pop() {
        h.handle(event);
    }
    assert!(h.watch.sent_with(keys::SONG_LENGTH).is_empty());
    assert_eq!(h.app.scheduler().deadline(Category::Music), Some(5_000));

    h.advance_to(6_000);
    assert_eq!(h.watch.sent_with(keys::SONG_LENGTH).len(), 1);
    assert_eq!(h.app.scheduler().deadline(Category::Music), Some(11_000));
}

#[test]
fn calendar_request_on_status_screen() {
    let mut h = Harness::started_with(SyncConfig {
        calendar_interval_ms: 60_000,
        ..Harness::quiet_config()
    });
    h.ack();

    h.advance_to(60_000);
    assert_eq!(h.watch.sent_with(keys::STATUS_UPDATE_CALENDAR).len(), 1);
    assert_eq!(h.watch.screen_enters(0), 1);
    assert_eq!(h.app.scheduler().deadline(Category::Calendar), Some(120_000));
}

#[test]
fn music_rearms_only_itself() {
    let mut h = Harness::started_with(SyncConfig {
        music_interval_ms: 5_000,
        ..Harness::quiet_config()
    });
    h.ack();
    let calendar = h.app.scheduler().deadline(Category::Calendar);

    h.advance_to(5_000);
    assert_eq!(h.watch.sent_with(keys::SONG_LENGTH).len(), 1);
    assert_eq!(h.app.scheduler().deadline(Category::Music), Some(10_000));
    assert_eq!(h.app.scheduler().deadline(Category::Calendar), calendar);
}

#[test]
fn forecast_is_one_shot() {
    let mut h = Harness::started_with(SyncConfig {
        forecast_delay_ms: 5_000,
        ..Harness::quiet_config()
    });
    h.ack();

    h.advance_to(5_000);
    assert_eq!(h.watch.screen_enters(1), 1);
    assert!(!h.app.scheduler().is_active(Category::Forecast));
}

#[test]
fn timer_deferred_once_while_in_flight() {
    let mut h = Harness::started_with(SyncConfig {
        music_interval_ms: 5_000,
        ..Harness::quiet_config()
    });
    // Start's screen-enter is never acknowledged.

    h.advance_to(5_000);
    assert_eq!(h.watch.sent.len(), 1);
    assert_eq!(h.app.scheduler().deadline(Category::Music), Some(6_000));

    h.advance_to(6_000);
    assert_eq!(h.watch.sent.len(), 1);
    assert_eq!(h.app.scheduler().deadline(Category::Music), Some(11_000));
}

#[test]
fn gps_interval_applies_after_gps_request() {
    let mut h = Harness::started_with(SyncConfig {
        gps_interval_ms: 60_000,
        ..Harness::quiet_config()
    });
    h.ack();

    // Unsolicited: ignored.
    h.receive(interval_msg(keys::UPDATE_INTERVAL, 300));
    assert_eq!(h.app.scheduler().deadline(Category::Gps), Some(60_000));

    h.advance_to(60_000);
    assert_eq!(h.watch.screen_enters(2), 1);
    assert!(h.app.is_gps_update_pending());

    h.advance_to(61_000);
    h.receive(interval_msg(keys::UPDATE_INTERVAL, 120));
    assert!(!h.app.is_gps_update_pending());
    assert_eq!(h.app.scheduler().deadline(Category::Gps), Some(181_000));
    assert_eq!(h.app.scheduler().interval_ms(Category::Gps), 120_000);
}

#[test]
fn stale_fire_after_reschedule_is_ignored() {
    let mut h = Harness::started_with(SyncConfig {
        weather_interval_ms: 60_000,
        ..Harness::quiet_config()
    });
    h.ack();

    h.watch.now_ms = 60_000;
    h.app.poll_timers(60_000, &mut h.queue);
    assert_eq!(h.queue.len(), 1);

    h.receive(interval_msg(keys::STATUS_UPDATE_WEATHER, 30));
    while let Some(event) = h.queue.pop() {
        h.handle(event);
    }

    assert_eq!(h.watch.screen_enters(1), 0);
    assert_eq!(h.app.scheduler().deadline(Category::Weather), Some(90_000));
}

#[test]
fn non_positive_interval_keeps_schedule() {
    let mut h = Harness::started();
    h.ack();
    h.receive(interval_msg(keys::STATUS_UPDATE_CALENDAR, 0));
    assert_eq!(h.app.scheduler().deadline(Category::Calendar), Some(60_000));
    assert_eq!(h.app.scheduler().interval_ms(Category::Calendar), 60_000);
}

// ── QA-3: recovery ───────────────────────────────────────────

#[test]
fn recovery_resets_sequence_then_reenters() {
    let mut h = Harness::started_with(Harness::quiet_config());
    h.ack();

    h.advance_to(1_000);
    h.handle(Event::SendFailed(TransportError::SendTimeout));
    assert_eq!(h.app.scheduler().deadline(Category::Recovery), Some(11_000));

    h.advance_to(11_000);
    assert_eq!(h.watch.sent.len(), 3);
    let reset = &h.watch.sent[1];
    assert_eq!(reset.len(), 1);
    assert_eq!(reset.find_i32(keys::SEQUENCE_NUMBER), Some(-1));
    let reenter = &h.watch.sent[2];
    assert_eq!(reenter.find_i32(keys::SEQUENCE_NUMBER), Some(2));
    assert_eq!(reenter.find_i32(keys::SCREEN_ENTER), Some(0));

    // Keeps trying until something gets through.
    assert_eq!(h.app.scheduler().deadline(Category::Recovery), Some(21_000));
    h.ack();
    assert!(!h.app.scheduler().is_active(Category::Recovery));
    assert_eq!(h.app.link_state(), LinkState::Connected);
}

#[test]
fn dropped_message_arms_recovery() {
    let mut h = Harness::started();
    h.ack();
    h.handle(Event::MessageDropped(TransportError::BufferOverflow));
    assert_eq!(h.sink.last_status(), Some("Over."));
    assert!(h.app.scheduler().is_active(Category::Recovery));
    assert_eq!(h.app.link_state(), LinkState::Disconnected);
}

#[test]
fn peer_loss_cancels_timers_and_regain_rearms() {
    let mut h = Harness::started();
    h.ack();

    h.watch.peer = false;
    h.handle(Event::PeerConnection(false));
    assert_eq!(h.sink.last_status(), Some("No BT"));
    assert_eq!(h.app.scheduler().active_count(), 0);

    h.watch.peer = true;
    h.handle(Event::PeerConnection(true));
    assert_eq!(h.sink.last_status(), Some(""));
    assert_eq!(h.watch.screen_enters(0), 2);
    assert_eq!(h.app.scheduler().active_count(), 4);
    assert!(!h.app.scheduler().is_active(Category::Forecast));
}

#[test]
fn sends_without_peer_are_silent() {
    let mut h = Harness::started();
    h.ack();
    h.watch.peer = false;
    h.handle(Event::Button(Button::SelectClick));
    assert_eq!(h.watch.sent.len(), 1);
    assert!(!h.app.is_sending());
}

// ── QA-4: inbound updates ────────────────────────────────────

#[test]
fn weather_fields_decoded() {
    let mut h = Harness::started();
    let mut msg = Dictionary::new();
    msg.write_cstring(keys::WEATHER_TEMP, "21C").unwrap();
    msg.write_uint8(keys::WEATHER_ICON, 6).unwrap();
    msg.write_cstring(keys::WEATHER_DAY1, "Wed : -3C").unwrap();
    h.receive(msg);

    let d = h.app.display();
    assert_eq!(d.weather_temp.as_str(), "21C");
    assert_eq!(d.weather_icon, Some(smartstatus::display::WeatherIcon::Snow));
    assert_eq!(d.tomorrow_temp.as_str(), "-3C");
    assert_eq!(h.app.link_state(), LinkState::Connected);
}

#[test]
fn phone_battery_pulses_once_below_twenty() {
    let mut h = Harness::started();
    for percent in [25u8, 19, 24, 19, 22] {
        let mut msg = Dictionary::new();
        msg.write_uint8(keys::BATTERY_PERCENT, percent).unwrap();
        h.receive(msg);
    }
    assert_eq!(h.sink.vibrations(VibePattern::ShortPulse), 1);

    for percent in [26u8, 19] {
        let mut msg = Dictionary::new();
        msg.write_uint8(keys::BATTERY_PERCENT, percent).unwrap();
        h.receive(msg);
    }
    assert_eq!(h.sink.vibrations(VibePattern::ShortPulse), 2);
}

// ── QA-5: appointment countdown ──────────────────────────────

#[test]
fn appointment_countdown_and_alerts() {
    let mut h = Harness::started();
    h.watch.local = LocalTime::new(12, 25, 14, 15);
    h.receive(cstring_msg(keys::CALENDAR_DATE_TIME, "12/25 14:30 Lunch"));
    assert_eq!(h.app.display().appointment.as_str(), "In 15 min");
    assert_eq!(h.sink.vibrations(VibePattern::ShortPulse), 1);

    h.handle(Event::MinuteTick(LocalTime::new(12, 25, 14, 30)));
    assert_eq!(h.app.display().appointment.as_str(), "Now!");
    assert_eq!(h.sink.vibrations(VibePattern::DoublePulse), 1);

    h.handle(Event::MinuteTick(LocalTime::new(12, 25, 14, 45)));
    assert_eq!(h.app.display().appointment.as_str(), "15 min in");
    assert_eq!(h.sink.vibrations(VibePattern::DoublePulse), 1);
    assert_eq!(h.sink.vibrations(VibePattern::ShortPulse), 1);
}

#[test]
fn malformed_appointment_suppresses_countdown() {
    let mut h = Harness::started();
    h.watch.local = LocalTime::new(12, 25, 14, 30);
    h.receive(cstring_msg(keys::CALENDAR_DATE_TIME, "12/25 ab:cd Oops"));
    assert_eq!(h.app.display().appointment.as_str(), "12/25 ab:cd");
    assert_eq!(h.sink.vibrations(VibePattern::ShortPulse), 0);
    assert_eq!(h.sink.vibrations(VibePattern::DoublePulse), 0);
}

#[test]
fn appointment_on_other_day_shows_stamp() {
    let mut h = Harness::started();
    h.watch.local = LocalTime::new(12, 24, 14, 30);
    h.receive(cstring_msg(keys::CALENDAR_DATE_TIME, "12/25 14:30 Lunch"));
    assert_eq!(h.app.display().appointment.as_str(), "12/25 14:30");
}

// ── QA-6: shutdown ───────────────────────────────────────────

#[test]
fn stop_exits_status_screen() {
    let mut h = Harness::started();
    h.ack();
    h.app.stop(&mut h.watch, &mut h.sink);
    assert_eq!(h.watch.last_sent().unwrap().find_i32(keys::SCREEN_EXIT), Some(0));
    assert_eq!(h.app.scheduler().active_count(), 0);
    assert_eq!(h.sink.events.last(), Some(&AppEvent::Stopped));
}
