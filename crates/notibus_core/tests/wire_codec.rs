use notibus_core::codec::wire::{decode, encode, tags, WireDict, WireValue};
use notibus_core::config::ProcessIdentity;
use notibus_core::model::bundle::Bundle;
use notibus_core::model::noti::{
    DisplayApplist, ExecuteSlot, ImageSlot, Layout, LedOperation, NotiType, Notification,
    PropertyFlags, SoundType, TextSlot, VibrationType,
};
use notibus_core::model::text::{CountPosition, FormatArg, NoLocalizer};
use notibus_core::{decode_tag, TextTag};

fn rich_record() -> Notification {
    let identity = ProcessIdentity::new("org.example.wire", 1200);
    let mut noti = Notification::new(NotiType::Ongoing, &identity);
    noti.set_group_id(11).unwrap();
    noti.set_launch_package(Some("org.example.viewer")).unwrap();
    noti.set_text(TextSlot::Title, Some("Sync"), Some("IDS_SYNC"));
    noti.set_text(TextSlot::Content, Some("%s updated at %s"), None);
    noti.set_format_args(
        TextSlot::Content,
        vec![
            FormatArg::Count {
                value: 2,
                position: CountPosition::Left,
            },
            FormatArg::Str("calendar".to_string()),
            FormatArg::Time(1_650_000_000),
        ],
    )
    .unwrap();
    noti.set_text_domain("sync", "/usr/share/locale").unwrap();
    noti.set_image(ImageSlot::Thumbnail, Some("/thumbs/cal.png"));
    let payload: Bundle = [("action", "retry")].into_iter().collect();
    noti.set_execute_option(ExecuteSlot::Responding, Some("Retry"), Some(payload));
    noti.set_vibration(VibrationType::Default, None).unwrap();
    noti.set_led(LedOperation::On, 0x00ff_00ff);
    noti.set_led_time_period(300, 700).unwrap();
    noti.set_time(1_650_000_123).unwrap();
    noti.set_property(PropertyFlags::DISABLE_AUTO_DELETE);
    noti.set_display_applist(DisplayApplist::NOTIFICATION_TRAY | DisplayApplist::LOCK);
    noti.set_progress_percentage(0.5).unwrap();
    noti.set_tag(Some("sync-job"));
    noti.set_auto_remove(false);
    noti.set_display_cache(Some("Calendar"), Some("/icons/cal.png"));
    noti
}

#[test]
fn rich_record_survives_encode_bytes_decode() {
    let noti = rich_record();
    let bytes = encode(&noti).to_bytes();
    let decoded = decode(&WireDict::from_bytes(&bytes).unwrap()).unwrap();

    assert_eq!(decoded, noti);
    assert_eq!(decoded.text_key(TextSlot::Title), Some("IDS_SYNC"));
    assert_eq!(decoded.execute_label(ExecuteSlot::Responding), Some("Retry"));
    assert_eq!(decoded.led_time_period(), (300, 700));
    // Display caches are not carried over the wire.
    assert_eq!(decoded.display_cache().app_name, None);
}

const AWKWARD_DOUBLES: [f64; 6] = [
    1.0715660391465826e-75,
    0.1 + 0.2,
    f64::MIN_POSITIVE,
    5e-324,
    f64::MAX,
    -9.007199254740993e15,
];

/// Record with every wire field away from its default.
fn full_record() -> Notification {
    let identity = ProcessIdentity::new("org.example.full", 4321);
    let mut noti = Notification::new(NotiType::Ongoing, &identity);
    noti.set_layout(Layout::OngoingProgress);
    noti.set_group_id(3).unwrap();
    noti.set_launch_package(Some("org.example.launcher")).unwrap();
    noti.set_text(TextSlot::Title, Some("Backup"), Some("IDS_BACKUP"));
    noti.set_text(TextSlot::Content, Some("%d %f %s"), None);
    noti.set_format_args(
        TextSlot::Content,
        vec![
            FormatArg::Int(-7),
            FormatArg::Count {
                value: 1000,
                position: CountPosition::None,
            },
            FormatArg::Str("photos".to_string()),
        ],
    )
    .unwrap();
    noti.set_format_args(
        TextSlot::Info1,
        AWKWARD_DOUBLES.iter().copied().map(FormatArg::Double).collect(),
    )
    .unwrap();
    noti.set_text_domain("backup", "/opt/locale").unwrap();
    noti.set_image(ImageSlot::Icon, Some("/icons/backup.png"));
    noti.set_image(ImageSlot::Background, Some("/bg/backup.png"));
    for (slot, label) in [
        (ExecuteSlot::Responding, "Reply"),
        (ExecuteSlot::SingleLaunch, "Open"),
        (ExecuteSlot::MultiLaunch, "Open all"),
    ] {
        let payload: Bundle = [("slot", label)].into_iter().collect();
        noti.set_execute_option(slot, Some(label), Some(payload));
    }
    noti.set_sound(SoundType::UserData, Some("/sounds/chime.ogg")).unwrap();
    noti.set_vibration(VibrationType::UserData, Some("/vib/pulse")).unwrap();
    noti.set_led(LedOperation::On, -1);
    noti.set_led_time_period(120, 880).unwrap();
    noti.set_time(1_700_000_001).unwrap();
    noti.set_property(PropertyFlags::DISPLAY_ONLY_SIMMODE | PropertyFlags::VOLATILE_DISPLAY);
    noti.set_display_applist(DisplayApplist::TICKER | DisplayApplist::INDICATOR);
    noti.set_progress_size(0.1 + 0.2).unwrap();
    noti.set_progress_percentage(1.0715660391465826e-75).unwrap();
    noti.set_tag(Some("backup-nightly"));
    noti.set_ongoing_flag(true);
    noti.set_auto_remove(true);

    // Store-assigned fields only arrive through decode.
    let mut dict = encode(&noti);
    dict.insert(tags::PRIV_ID, WireValue::Int(77));
    dict.insert(tags::INTERNAL_GROUP_ID, WireValue::Int(70));
    dict.insert(tags::INSERT_TIME, WireValue::Long(4_102_444_800));
    decode(&dict).unwrap()
}

#[test]
fn every_field_survives_round_trip_in_memory_and_as_bytes() {
    let noti = full_record();
    assert_eq!(noti.priv_id(), 77);
    assert_eq!(noti.internal_group_id(), 70);
    assert_eq!(noti.insert_time(), 4_102_444_800);

    let dict = encode(&noti);
    for tag in 1..=tags::UID {
        assert!(dict.contains(tag), "tag {tag} was left at its default");
    }
    assert_eq!(decode(&dict).unwrap(), noti);

    let decoded = decode(&WireDict::from_bytes(&dict.to_bytes()).unwrap()).unwrap();
    assert_eq!(decoded, noti);
    let doubles: Vec<f64> = decoded
        .format_args(TextSlot::Info1)
        .iter()
        .map(|arg| match arg {
            FormatArg::Double(value) => *value,
            other => panic!("unexpected argument: {other:?}"),
        })
        .collect();
    let bits = |values: &[f64]| values.iter().map(|value| value.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&doubles), bits(&AWKWARD_DOUBLES));
}

#[test]
fn double_arguments_keep_every_bit_through_bytes() {
    let identity = ProcessIdentity::new("org.example.wire", 0);
    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    let mut checked = 0;
    while checked < 2_000 {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let value = f64::from_bits(state);
        if !value.is_finite() {
            continue;
        }
        let mut noti = Notification::new(NotiType::Transient, &identity);
        noti.set_format_args(TextSlot::Content, vec![FormatArg::Double(value)]).unwrap();
        let bytes = encode(&noti).to_bytes();
        let decoded = decode(&WireDict::from_bytes(&bytes).unwrap()).unwrap();
        assert_eq!(decoded, noti, "double {value:e} changed on the wire");
        checked += 1;
    }
}

#[test]
fn blank_record_encodes_to_empty_dictionary() {
    assert!(encode(&Notification::default()).is_empty());
}

#[test]
fn encoder_omits_fields_left_at_default() {
    let dict = encode(&Notification::new(
        NotiType::Transient,
        &ProcessIdentity::new("org.example.wire", 0),
    ));
    assert!(dict.contains(tags::CALLER_PACKAGE));
    assert!(!dict.contains(tags::TYPE));
    assert!(!dict.contains(tags::TEXTS));
    assert!(!dict.contains(tags::SOUND_PATH));
    assert!(!dict.contains(tags::UID));
}

#[test]
fn unknown_tags_are_ignored_on_decode() {
    let noti = rich_record();
    let mut dict = encode(&noti);
    dict.insert(900, WireValue::Str("from a newer service".to_string()));
    assert_eq!(decode(&dict).unwrap(), noti);
}

#[test]
fn out_of_range_type_yields_no_record() {
    assert!(Notification::create(2).is_none());
    assert!(Notification::create(-1).is_none());
    assert!(Notification::create(NotiType::Ongoing.as_raw()).is_some());
}

#[test]
fn out_of_range_type_on_the_wire_is_invalid_data() {
    let mut dict = WireDict::new();
    dict.insert(tags::TYPE, WireValue::Int(7));
    assert_eq!(decode(&dict).unwrap_err().code(), "invalid_data");
}

#[test]
fn decoded_template_renders_prefix_count_and_time_tag() {
    let decoded = decode(&encode(&rich_record())).unwrap();
    let rendered = decoded.text(TextSlot::Content, &NoLocalizer).unwrap();

    assert!(rendered.starts_with("2 calendar updated at "));
    let (tag, value) = decode_tag(&rendered).unwrap();
    assert_eq!(tag, TextTag::Time);
    assert_eq!(value, "1650000000");
}
