//! Sparse tagged dictionary codec for notification records.
//!
//! # Responsibility
//! - Encode a record into `tag -> value` pairs, omitting default fields.
//! - Decode a dictionary back into a record, tag by tag.
//!
//! # Invariants
//! - The omission default for every field is the value of
//!   `Notification::default()`, which is also what a missing tag decodes to.
//! - Sub-dictionaries travel as their flattened string form.
//! - Tags outside the known set are ignored; a known tag carrying the wrong
//!   value type is rejected.
//! - Display caches are never encoded.

use crate::error::{NotiError, NotiResult};
use crate::model::bundle::{self, Bundle};
use crate::model::noti::{
    DisplayApplist, ExecuteSlot, LedOperation, Layout, NotiType, Notification, PropertyFlags,
    SoundType, VibrationType,
};
use crate::model::text::FormatArgs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable field tags. Never renumber; only append.
pub mod tags {
    pub const TYPE: u16 = 1;
    pub const LAYOUT: u16 = 2;
    pub const GROUP_ID: u16 = 3;
    pub const INTERNAL_GROUP_ID: u16 = 4;
    pub const PRIV_ID: u16 = 5;
    pub const CALLER_PACKAGE: u16 = 6;
    pub const LAUNCH_PACKAGE: u16 = 7;
    pub const TEXTS: u16 = 8;
    pub const TEXT_KEYS: u16 = 9;
    pub const FORMAT_ARGS: u16 = 10;
    pub const NUM_FORMAT_ARGS: u16 = 11;
    pub const DOMAIN: u16 = 12;
    pub const DIR: u16 = 13;
    pub const IMAGES: u16 = 14;
    pub const EXECUTE_LABELS: u16 = 15;
    pub const RESPONDING_PAYLOAD: u16 = 16;
    pub const SINGLE_LAUNCH_PAYLOAD: u16 = 17;
    pub const MULTI_LAUNCH_PAYLOAD: u16 = 18;
    pub const SOUND_TYPE: u16 = 19;
    pub const SOUND_PATH: u16 = 20;
    pub const VIBRATION_TYPE: u16 = 21;
    pub const VIBRATION_PATH: u16 = 22;
    pub const LED_OPERATION: u16 = 23;
    pub const LED_ARGB: u16 = 24;
    pub const LED_ON_MS: u16 = 25;
    pub const LED_OFF_MS: u16 = 26;
    pub const TIME: u16 = 27;
    pub const INSERT_TIME: u16 = 28;
    pub const PROPERTY: u16 = 29;
    pub const DISPLAY_APPLIST: u16 = 30;
    pub const PROGRESS_SIZE: u16 = 31;
    pub const PROGRESS_PERCENTAGE: u16 = 32;
    pub const TAG: u16 = 33;
    pub const ONGOING_FLAG: u16 = 34;
    pub const AUTO_REMOVE: u16 = 35;
    pub const UID: u16 = 36;
}

const PAYLOAD_TAGS: [(ExecuteSlot, u16); 3] = [
    (ExecuteSlot::Responding, tags::RESPONDING_PAYLOAD),
    (ExecuteSlot::SingleLaunch, tags::SINGLE_LAUNCH_PAYLOAD),
    (ExecuteSlot::MultiLaunch, tags::MULTI_LAUNCH_PAYLOAD),
];

/// One typed wire value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireValue {
    Int(i32),
    Long(i64),
    Double(f64),
    Str(String),
}

impl WireValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Double(_) => "double",
            Self::Str(_) => "string",
        }
    }
}

/// Sparse `tag -> value` mapping exchanged with the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WireDict(BTreeMap<u16, WireValue>);

impl WireDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: u16, value: WireValue) -> Option<WireValue> {
        self.0.insert(tag, value)
    }

    pub fn get(&self, tag: u16) -> Option<&WireValue> {
        self.0.get(&tag)
    }

    pub fn contains(&self, tag: u16) -> bool {
        self.0.contains_key(&tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = u16> + '_ {
        self.0.keys().copied()
    }

    /// Serialized byte form for transports that move opaque payloads.
    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }

    pub fn from_bytes(bytes: &[u8]) -> NotiResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|err| NotiError::InvalidData(format!("malformed wire payload: {err}")))
    }

    fn int(&self, tag: u16) -> NotiResult<Option<i32>> {
        match self.get(tag) {
            None => Ok(None),
            Some(WireValue::Int(value)) => Ok(Some(*value)),
            Some(other) => Err(type_mismatch(tag, "int", other)),
        }
    }

    fn long(&self, tag: u16) -> NotiResult<Option<i64>> {
        match self.get(tag) {
            None => Ok(None),
            Some(WireValue::Long(value)) => Ok(Some(*value)),
            Some(WireValue::Int(value)) => Ok(Some(i64::from(*value))),
            Some(other) => Err(type_mismatch(tag, "long", other)),
        }
    }

    fn double(&self, tag: u16) -> NotiResult<Option<f64>> {
        match self.get(tag) {
            None => Ok(None),
            Some(WireValue::Double(value)) => Ok(Some(*value)),
            Some(other) => Err(type_mismatch(tag, "double", other)),
        }
    }

    fn string(&self, tag: u16) -> NotiResult<Option<&str>> {
        match self.get(tag) {
            None => Ok(None),
            Some(WireValue::Str(value)) => Ok(Some(value.as_str())),
            Some(other) => Err(type_mismatch(tag, "string", other)),
        }
    }

    fn put_int(&mut self, tag: u16, value: i32, default: i32) {
        if value != default {
            self.insert(tag, WireValue::Int(value));
        }
    }

    fn put_long(&mut self, tag: u16, value: i64, default: i64) {
        if value != default {
            self.insert(tag, WireValue::Long(value));
        }
    }

    fn put_double(&mut self, tag: u16, value: f64, default: f64) {
        if value != default {
            self.insert(tag, WireValue::Double(value));
        }
    }

    fn put_bool(&mut self, tag: u16, value: bool, default: bool) {
        self.put_int(tag, i32::from(value), i32::from(default));
    }

    fn put_str(&mut self, tag: u16, value: Option<&str>) {
        if let Some(value) = value {
            self.insert(tag, WireValue::Str(value.to_string()));
        }
    }

    fn put_bundle(&mut self, tag: u16, value: Option<&Bundle>) {
        self.put_str(tag, bundle::flatten_opt(value).as_deref());
    }
}

fn type_mismatch(tag: u16, expected: &str, actual: &WireValue) -> NotiError {
    NotiError::InvalidData(format!(
        "wire tag {tag} expected {expected}, got {}",
        actual.type_name()
    ))
}

fn decode_enum<T>(raw: i32, tag: u16, parse: fn(i32) -> Option<T>) -> NotiResult<T> {
    parse(raw).ok_or_else(|| NotiError::InvalidData(format!("wire tag {tag} has unknown code {raw}")))
}

/// Encodes a record, emitting only fields that differ from the blank record.
pub fn encode(noti: &Notification) -> WireDict {
    let blank = Notification::default();
    let mut dict = WireDict::new();

    dict.put_int(tags::TYPE, noti.kind.as_raw(), blank.kind.as_raw());
    dict.put_int(tags::LAYOUT, noti.layout.as_raw(), blank.layout.as_raw());
    dict.put_int(tags::GROUP_ID, noti.group_id, blank.group_id);
    dict.put_int(
        tags::INTERNAL_GROUP_ID,
        noti.internal_group_id,
        blank.internal_group_id,
    );
    dict.put_int(tags::PRIV_ID, noti.priv_id, blank.priv_id);
    dict.put_str(tags::CALLER_PACKAGE, noti.caller_package.as_deref());
    dict.put_str(tags::LAUNCH_PACKAGE, noti.launch_package.as_deref());

    dict.put_bundle(tags::TEXTS, noti.texts.as_ref());
    dict.put_bundle(tags::TEXT_KEYS, noti.text_keys.as_ref());
    if let Some(format_args) = noti.format_args.as_ref() {
        dict.put_str(tags::FORMAT_ARGS, Some(&format_args.flatten()));
        dict.put_int(tags::NUM_FORMAT_ARGS, format_args.total() as i32, 0);
    }
    dict.put_str(tags::DOMAIN, noti.domain.as_deref());
    dict.put_str(tags::DIR, noti.dir.as_deref());
    dict.put_bundle(tags::IMAGES, noti.images.as_ref());
    dict.put_bundle(tags::EXECUTE_LABELS, noti.execute_labels.as_ref());
    for (slot, tag) in PAYLOAD_TAGS {
        dict.put_bundle(tag, noti.execute_payload(slot));
    }

    dict.put_int(
        tags::SOUND_TYPE,
        noti.sound_type.as_raw(),
        blank.sound_type.as_raw(),
    );
    dict.put_str(tags::SOUND_PATH, noti.sound_path.as_deref());
    dict.put_int(
        tags::VIBRATION_TYPE,
        noti.vibration_type.as_raw(),
        blank.vibration_type.as_raw(),
    );
    dict.put_str(tags::VIBRATION_PATH, noti.vibration_path.as_deref());
    dict.put_int(
        tags::LED_OPERATION,
        noti.led_operation.as_raw(),
        blank.led_operation.as_raw(),
    );
    dict.put_int(tags::LED_ARGB, noti.led_argb, blank.led_argb);
    dict.put_int(tags::LED_ON_MS, noti.led_on_ms, blank.led_on_ms);
    dict.put_int(tags::LED_OFF_MS, noti.led_off_ms, blank.led_off_ms);

    dict.put_long(tags::TIME, noti.time, blank.time);
    dict.put_long(tags::INSERT_TIME, noti.insert_time, blank.insert_time);
    dict.put_int(
        tags::PROPERTY,
        noti.property.bits() as i32,
        blank.property.bits() as i32,
    );
    dict.put_int(
        tags::DISPLAY_APPLIST,
        noti.display_applist.bits() as i32,
        blank.display_applist.bits() as i32,
    );
    dict.put_double(tags::PROGRESS_SIZE, noti.progress_size, blank.progress_size);
    dict.put_double(
        tags::PROGRESS_PERCENTAGE,
        noti.progress_percentage,
        blank.progress_percentage,
    );
    dict.put_str(tags::TAG, noti.tag.as_deref());
    dict.put_bool(tags::ONGOING_FLAG, noti.ongoing_flag, blank.ongoing_flag);
    dict.put_bool(tags::AUTO_REMOVE, noti.auto_remove, blank.auto_remove);
    dict.put_int(tags::UID, noti.uid, blank.uid);

    dict
}

/// Decodes a record; every tag is optional and unknown tags are ignored.
pub fn decode(dict: &WireDict) -> NotiResult<Notification> {
    let mut noti = Notification::default();

    if let Some(raw) = dict.int(tags::TYPE)? {
        noti.kind = decode_enum(raw, tags::TYPE, NotiType::from_raw)?;
    }
    if let Some(raw) = dict.int(tags::LAYOUT)? {
        noti.layout = decode_enum(raw, tags::LAYOUT, Layout::from_raw)?;
    }
    if let Some(value) = dict.int(tags::GROUP_ID)? {
        noti.group_id = value;
    }
    if let Some(value) = dict.int(tags::INTERNAL_GROUP_ID)? {
        noti.internal_group_id = value;
    }
    if let Some(value) = dict.int(tags::PRIV_ID)? {
        noti.priv_id = value;
    }
    noti.caller_package = dict.string(tags::CALLER_PACKAGE)?.map(str::to_string);
    noti.launch_package = dict.string(tags::LAUNCH_PACKAGE)?.map(str::to_string);

    noti.texts = bundle::parse_opt(dict.string(tags::TEXTS)?)?;
    noti.text_keys = bundle::parse_opt(dict.string(tags::TEXT_KEYS)?)?;
    if let Some(flattened) = dict.string(tags::FORMAT_ARGS)? {
        noti.format_args = FormatArgs::parse(flattened)?;
    }
    if let Some(declared) = dict.int(tags::NUM_FORMAT_ARGS)? {
        let actual = noti.num_format_args();
        if usize::try_from(declared).ok() != Some(actual) {
            return Err(NotiError::InvalidData(format!(
                "declared {declared} format args but decoded {actual}"
            )));
        }
    }
    noti.domain = dict.string(tags::DOMAIN)?.map(str::to_string);
    noti.dir = dict.string(tags::DIR)?.map(str::to_string);
    noti.images = bundle::parse_opt(dict.string(tags::IMAGES)?)?;
    noti.execute_labels = bundle::parse_opt(dict.string(tags::EXECUTE_LABELS)?)?;
    for (slot, tag) in PAYLOAD_TAGS {
        noti.execute_payloads[slot.as_raw() as usize] = bundle::parse_opt(dict.string(tag)?)?;
    }

    if let Some(raw) = dict.int(tags::SOUND_TYPE)? {
        noti.sound_type = decode_enum(raw, tags::SOUND_TYPE, SoundType::from_raw)?;
    }
    noti.sound_path = dict.string(tags::SOUND_PATH)?.map(str::to_string);
    if let Some(raw) = dict.int(tags::VIBRATION_TYPE)? {
        noti.vibration_type = decode_enum(raw, tags::VIBRATION_TYPE, VibrationType::from_raw)?;
    }
    noti.vibration_path = dict.string(tags::VIBRATION_PATH)?.map(str::to_string);
    if let Some(raw) = dict.int(tags::LED_OPERATION)? {
        noti.led_operation = decode_enum(raw, tags::LED_OPERATION, LedOperation::from_raw)?;
    }
    if let Some(value) = dict.int(tags::LED_ARGB)? {
        noti.led_argb = value;
    }
    if let Some(value) = dict.int(tags::LED_ON_MS)? {
        noti.led_on_ms = value;
    }
    if let Some(value) = dict.int(tags::LED_OFF_MS)? {
        noti.led_off_ms = value;
    }

    if let Some(value) = dict.long(tags::TIME)? {
        noti.time = value;
    }
    if let Some(value) = dict.long(tags::INSERT_TIME)? {
        noti.insert_time = value;
    }
    if let Some(bits) = dict.int(tags::PROPERTY)? {
        noti.property = PropertyFlags::from_bits_retain(bits as u32);
    }
    if let Some(bits) = dict.int(tags::DISPLAY_APPLIST)? {
        noti.display_applist = DisplayApplist::from_bits_retain(bits as u32);
    }
    if let Some(value) = dict.double(tags::PROGRESS_SIZE)? {
        noti.progress_size = value;
    }
    if let Some(value) = dict.double(tags::PROGRESS_PERCENTAGE)? {
        noti.progress_percentage = value;
    }
    noti.tag = dict.string(tags::TAG)?.map(str::to_string);
    if let Some(value) = dict.int(tags::ONGOING_FLAG)? {
        noti.ongoing_flag = value != 0;
    }
    if let Some(value) = dict.int(tags::AUTO_REMOVE)? {
        noti.auto_remove = value != 0;
    }
    if let Some(value) = dict.int(tags::UID)? {
        noti.uid = value;
    }

    Ok(noti)
}

/// Decodes every dictionary of a list reply, preserving order.
pub fn decode_list(dicts: &[WireDict]) -> NotiResult<Vec<Notification>> {
    dicts.iter().map(decode).collect()
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, tags, WireDict, WireValue};
    use crate::model::noti::Notification;

    #[test]
    fn blank_record_encodes_to_empty_dictionary() {
        assert!(encode(&Notification::default()).is_empty());
    }

    #[test]
    fn empty_dictionary_decodes_to_blank_record() {
        assert_eq!(decode(&WireDict::new()).unwrap(), Notification::default());
    }

    #[test]
    fn unknown_tags_are_ignored() {
        let mut dict = WireDict::new();
        dict.insert(tags::PRIV_ID, WireValue::Int(9));
        dict.insert(900, WireValue::Str("from a newer service".to_string()));
        let noti = decode(&dict).unwrap();
        assert_eq!(noti.priv_id(), 9);
    }

    #[test]
    fn wrong_value_type_is_rejected() {
        let mut dict = WireDict::new();
        dict.insert(tags::TYPE, WireValue::Str("ongoing".to_string()));
        assert_eq!(decode(&dict).unwrap_err().code(), "invalid_data");
    }

    #[test]
    fn out_of_range_type_code_is_rejected() {
        let mut dict = WireDict::new();
        dict.insert(tags::TYPE, WireValue::Int(7));
        assert_eq!(decode(&dict).unwrap_err().code(), "invalid_data");
    }

    #[test]
    fn empty_bundle_string_decodes_to_absent() {
        let mut dict = WireDict::new();
        dict.insert(tags::IMAGES, WireValue::Str(String::new()));
        assert!(decode(&dict).unwrap().images.is_none());
    }
}
