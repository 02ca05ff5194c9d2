//! Notification record value object.
//!
//! # Responsibility
//! - Own every notification field and its keyed sub-dictionaries.
//! - Validate each setter's own domain without partial mutation.
//!
//! # Invariants
//! - `kind` is always a defined `NotiType`; raw codes outside the range are
//!   rejected by `Notification::create`.
//! - `priv_id`, `internal_group_id` and `insert_time` are written only by the
//!   store (or decoded from the service), never by application setters.
//! - A sub-dictionary that loses its last entry becomes `None`.
//! - Display caches never participate in equality and are reset by `clone`.

use crate::config::ProcessIdentity;
use crate::error::{NotiError, NotiResult};
use crate::model::bundle::Bundle;
use crate::model::text::{FormatArg, FormatArgs};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Store-assigned notification id, unique per caller package.
pub type PrivId = i32;
/// Application-chosen grouping request or store-resolved group id.
pub type GroupId = i32;

/// `priv_id` before the store assigns one.
pub const PRIV_ID_NONE: PrivId = -1;
/// Ungrouped notification.
pub const GROUP_ID_NONE: GroupId = -1;
/// Group by resolved title key.
pub const GROUP_ID_DEFAULT: GroupId = 0;

raw_code_enum! {
    /// Notification lifetime category.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum NotiType {
        #[default]
        Transient = 0,
        Ongoing = 1,
    }
}

raw_code_enum! {
    /// Presentation hint.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Layout {
        #[default]
        None = 0,
        SingleEvent = 1,
        MultipleEvent = 2,
        Thumbnail = 3,
        OngoingEvent = 4,
        OngoingProgress = 5,
    }
}

impl Layout {
    /// Layout stamped by the constructor for a given type.
    pub fn default_for(kind: NotiType) -> Self {
        match kind {
            NotiType::Transient => Self::SingleEvent,
            NotiType::Ongoing => Self::OngoingEvent,
        }
    }
}

raw_code_enum! {
    /// Text slot keys used by the text, key and format-argument dictionaries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TextSlot {
        Title = 0,
        Content = 1,
        ContentForDisplayOptionIsOff = 2,
        EventCount = 3,
        Info1 = 4,
        Info1Sub = 5,
        Info2 = 6,
        Info2Sub = 7,
        Info3 = 8,
        Info3Sub = 9,
        GroupTitle = 10,
        GroupContent = 11,
        GroupContentForDisplayOptionIsOff = 12,
    }
}

raw_code_enum! {
    /// Image slot keys.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub enum ImageSlot {
        Icon = 0,
        IconForIndicator = 1,
        IconForLock = 2,
        Thumbnail = 3,
        ThumbnailForLock = 4,
        IconSub = 5,
        Background = 6,
        List1 = 7,
        List2 = 8,
        List3 = 9,
        List4 = 10,
        List5 = 11,
    }
}

raw_code_enum! {
    /// Execution slots, each with its own service-invocation payload.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum ExecuteSlot {
        Responding = 0,
        SingleLaunch = 1,
        MultiLaunch = 2,
    }
}

raw_code_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum SoundType {
        #[default]
        None = 0,
        Default = 1,
        UserData = 2,
    }
}

raw_code_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum VibrationType {
        #[default]
        None = 0,
        Default = 1,
        UserData = 2,
    }
}

raw_code_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum LedOperation {
        #[default]
        Off = 0,
        On = 1,
    }
}

bitflags! {
    /// Boolean notification properties.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PropertyFlags: u32 {
        /// Show only while a SIM card is present.
        const DISPLAY_ONLY_SIMMODE = 0x1;
        const DISABLE_TICKER = 0x2;
        const DISABLE_APP_LAUNCH = 0x4;
        const DISABLE_AUTO_DELETE = 0x8;
        const LAUNCH_UPDATE = 0x10;
        const VOLATILE_DISPLAY = 0x100;
    }
}

bitflags! {
    /// Surfaces a notification may be shown on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DisplayApplist: u32 {
        const NOTIFICATION_TRAY = 0x1;
        const TICKER = 0x2;
        const LOCK = 0x4;
        const INDICATOR = 0x8;
        const ACTIVE = 0x10;
        const ALL = Self::NOTIFICATION_TRAY.bits()
            | Self::TICKER.bits()
            | Self::LOCK.bits()
            | Self::INDICATOR.bits()
            | Self::ACTIVE.bits();
    }
}

/// Resolved app name/icon filled in by the embedder for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayCache {
    pub app_name: Option<String>,
    pub app_icon: Option<String>,
}

/// One notification record.
#[derive(Debug)]
pub struct Notification {
    pub(crate) kind: NotiType,
    pub(crate) layout: Layout,
    pub(crate) group_id: GroupId,
    pub(crate) internal_group_id: GroupId,
    pub(crate) priv_id: PrivId,
    pub(crate) caller_package: Option<String>,
    pub(crate) launch_package: Option<String>,
    pub(crate) texts: Option<Bundle>,
    pub(crate) text_keys: Option<Bundle>,
    pub(crate) format_args: Option<FormatArgs>,
    pub(crate) domain: Option<String>,
    pub(crate) dir: Option<String>,
    pub(crate) images: Option<Bundle>,
    pub(crate) execute_labels: Option<Bundle>,
    pub(crate) execute_payloads: [Option<Bundle>; 3],
    pub(crate) sound_type: SoundType,
    pub(crate) sound_path: Option<String>,
    pub(crate) vibration_type: VibrationType,
    pub(crate) vibration_path: Option<String>,
    pub(crate) led_operation: LedOperation,
    pub(crate) led_argb: i32,
    pub(crate) led_on_ms: i32,
    pub(crate) led_off_ms: i32,
    pub(crate) time: i64,
    pub(crate) insert_time: i64,
    pub(crate) property: PropertyFlags,
    pub(crate) display_applist: DisplayApplist,
    pub(crate) progress_size: f64,
    pub(crate) progress_percentage: f64,
    pub(crate) tag: Option<String>,
    pub(crate) ongoing_flag: bool,
    pub(crate) auto_remove: bool,
    pub(crate) uid: i32,
    pub(crate) cache: DisplayCache,
}

// The display cache is not part of record identity.
impl PartialEq for Notification {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.layout == other.layout
            && self.group_id == other.group_id
            && self.internal_group_id == other.internal_group_id
            && self.priv_id == other.priv_id
            && self.caller_package == other.caller_package
            && self.launch_package == other.launch_package
            && self.texts == other.texts
            && self.text_keys == other.text_keys
            && self.format_args == other.format_args
            && self.domain == other.domain
            && self.dir == other.dir
            && self.images == other.images
            && self.execute_labels == other.execute_labels
            && self.execute_payloads == other.execute_payloads
            && self.sound_type == other.sound_type
            && self.sound_path == other.sound_path
            && self.vibration_type == other.vibration_type
            && self.vibration_path == other.vibration_path
            && self.led_operation == other.led_operation
            && self.led_argb == other.led_argb
            && self.led_on_ms == other.led_on_ms
            && self.led_off_ms == other.led_off_ms
            && self.time == other.time
            && self.insert_time == other.insert_time
            && self.property == other.property
            && self.display_applist == other.display_applist
            && self.progress_size == other.progress_size
            && self.progress_percentage == other.progress_percentage
            && self.tag == other.tag
            && self.ongoing_flag == other.ongoing_flag
            && self.auto_remove == other.auto_remove
            && self.uid == other.uid
    }
}

/// Blank record: the value every omitted wire tag decodes to.
impl Default for Notification {
    fn default() -> Self {
        Self {
            kind: NotiType::Transient,
            layout: Layout::None,
            group_id: GROUP_ID_NONE,
            internal_group_id: GROUP_ID_NONE,
            priv_id: PRIV_ID_NONE,
            caller_package: None,
            launch_package: None,
            texts: None,
            text_keys: None,
            format_args: None,
            domain: None,
            dir: None,
            images: None,
            execute_labels: None,
            execute_payloads: [None, None, None],
            sound_type: SoundType::None,
            sound_path: None,
            vibration_type: VibrationType::None,
            vibration_path: None,
            led_operation: LedOperation::Off,
            led_argb: 0,
            led_on_ms: 0,
            led_off_ms: 0,
            time: 0,
            insert_time: 0,
            property: PropertyFlags::empty(),
            display_applist: DisplayApplist::empty(),
            progress_size: 0.0,
            progress_percentage: 0.0,
            tag: None,
            ongoing_flag: false,
            auto_remove: false,
            uid: 0,
            cache: DisplayCache::default(),
        }
    }
}

impl Clone for Notification {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            layout: self.layout,
            group_id: self.group_id,
            internal_group_id: self.internal_group_id,
            priv_id: self.priv_id,
            caller_package: self.caller_package.clone(),
            launch_package: self.launch_package.clone(),
            texts: self.texts.clone(),
            text_keys: self.text_keys.clone(),
            format_args: self.format_args.clone(),
            domain: self.domain.clone(),
            dir: self.dir.clone(),
            images: self.images.clone(),
            execute_labels: self.execute_labels.clone(),
            execute_payloads: self.execute_payloads.clone(),
            sound_type: self.sound_type,
            sound_path: self.sound_path.clone(),
            vibration_type: self.vibration_type,
            vibration_path: self.vibration_path.clone(),
            led_operation: self.led_operation,
            led_argb: self.led_argb,
            led_on_ms: self.led_on_ms,
            led_off_ms: self.led_off_ms,
            time: self.time,
            insert_time: self.insert_time,
            property: self.property,
            display_applist: self.display_applist,
            progress_size: self.progress_size,
            progress_percentage: self.progress_percentage,
            tag: self.tag.clone(),
            ongoing_flag: self.ongoing_flag,
            auto_remove: self.auto_remove,
            uid: self.uid,
            cache: DisplayCache::default(),
        }
    }
}

impl Notification {
    /// Creates a record of `kind` stamped with `identity`.
    ///
    /// # Invariants
    /// - `layout` is the type's default layout.
    /// - Ids start at their "none" sentinels.
    /// - The record may show on every display surface and is auto-removed on
    ///   activation until told otherwise.
    pub fn new(kind: NotiType, identity: &ProcessIdentity) -> Self {
        Self {
            kind,
            layout: Layout::default_for(kind),
            caller_package: Some(identity.package.clone()),
            uid: identity.uid,
            display_applist: DisplayApplist::ALL,
            auto_remove: true,
            ..Self::default()
        }
    }

    /// Creates a record from a raw type code using the process identity.
    ///
    /// Returns `None` when `raw_type` is not a defined `NotiType`.
    pub fn create(raw_type: i32) -> Option<Self> {
        let kind = NotiType::from_raw(raw_type)?;
        Some(Self::new(kind, ProcessIdentity::current()))
    }

    pub fn kind(&self) -> NotiType {
        self.kind
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    /// Sets the grouping request: none, default (by title) or explicit.
    pub fn set_group_id(&mut self, group_id: GroupId) -> NotiResult<()> {
        if group_id < GROUP_ID_NONE {
            return Err(NotiError::invalid(format!("group id {group_id} is out of range")));
        }
        self.group_id = group_id;
        Ok(())
    }

    pub fn internal_group_id(&self) -> GroupId {
        self.internal_group_id
    }

    pub fn priv_id(&self) -> PrivId {
        self.priv_id
    }

    pub fn caller_package(&self) -> Option<&str> {
        self.caller_package.as_deref()
    }

    pub fn launch_package(&self) -> Option<&str> {
        self.launch_package.as_deref()
    }

    pub fn set_launch_package(&mut self, package: Option<&str>) -> NotiResult<()> {
        if matches!(package, Some(value) if value.trim().is_empty()) {
            return Err(NotiError::invalid("launch package cannot be blank"));
        }
        self.launch_package = package.map(str::to_string);
        Ok(())
    }

    /// Sets the plain text and localization key of one slot.
    ///
    /// `None` clears the respective value.
    pub fn set_text(&mut self, slot: TextSlot, text: Option<&str>, key: Option<&str>) {
        let slot_key = slot.as_raw().to_string();
        set_bundle_entry(&mut self.texts, &slot_key, text);
        set_bundle_entry(&mut self.text_keys, &slot_key, key);
    }

    /// Plain stored text of a slot, without localization or formatting.
    pub fn text_raw(&self, slot: TextSlot) -> Option<&str> {
        bundle_entry(self.texts.as_ref(), &slot.as_raw().to_string())
    }

    pub fn text_key(&self, slot: TextSlot) -> Option<&str> {
        bundle_entry(self.text_keys.as_ref(), &slot.as_raw().to_string())
    }

    /// Replaces the positional format arguments of one slot.
    ///
    /// An empty list clears the slot.
    pub fn set_format_args(&mut self, slot: TextSlot, args: Vec<FormatArg>) -> NotiResult<()> {
        for arg in &args {
            arg.validate()?;
        }
        let mut format_args = self.format_args.take().unwrap_or_default();
        format_args.set(slot, args);
        self.format_args = (!format_args.is_empty()).then_some(format_args);
        Ok(())
    }

    pub fn format_args(&self, slot: TextSlot) -> &[FormatArg] {
        self.format_args
            .as_ref()
            .map_or(&[][..], |format_args| format_args.get(slot))
    }

    /// Total number of positional arguments across every slot.
    pub fn num_format_args(&self) -> usize {
        self.format_args.as_ref().map_or(0, FormatArgs::total)
    }

    /// Sets the localization domain and its directory.
    pub fn set_text_domain(&mut self, domain: &str, dir: &str) -> NotiResult<()> {
        if domain.trim().is_empty() || dir.trim().is_empty() {
            return Err(NotiError::invalid("text domain and dir cannot be blank"));
        }
        self.domain = Some(domain.to_string());
        self.dir = Some(dir.to_string());
        Ok(())
    }

    pub fn text_domain(&self) -> Option<(&str, &str)> {
        Some((self.domain.as_deref()?, self.dir.as_deref()?))
    }

    pub fn set_image(&mut self, slot: ImageSlot, path: Option<&str>) {
        set_bundle_entry(&mut self.images, &slot.as_raw().to_string(), path);
    }

    pub fn image(&self, slot: ImageSlot) -> Option<&str> {
        bundle_entry(self.images.as_ref(), &slot.as_raw().to_string())
    }

    /// Sets the label and service-invocation payload of an execution slot.
    pub fn set_execute_option(
        &mut self,
        slot: ExecuteSlot,
        label: Option<&str>,
        payload: Option<Bundle>,
    ) {
        set_bundle_entry(&mut self.execute_labels, &slot.as_raw().to_string(), label);
        self.execute_payloads[slot_index(slot)] = payload.filter(|bundle| !bundle.is_empty());
    }

    pub fn execute_label(&self, slot: ExecuteSlot) -> Option<&str> {
        bundle_entry(self.execute_labels.as_ref(), &slot.as_raw().to_string())
    }

    pub fn execute_payload(&self, slot: ExecuteSlot) -> Option<&Bundle> {
        self.execute_payloads[slot_index(slot)].as_ref()
    }

    /// Sets the sound; `UserData` requires a path.
    pub fn set_sound(&mut self, sound_type: SoundType, path: Option<&str>) -> NotiResult<()> {
        validate_user_path(sound_type == SoundType::UserData, path, "sound")?;
        self.sound_type = sound_type;
        self.sound_path = path.map(str::to_string);
        Ok(())
    }

    pub fn sound(&self) -> (SoundType, Option<&str>) {
        (self.sound_type, self.sound_path.as_deref())
    }

    /// Sets the vibration; `UserData` requires a path.
    pub fn set_vibration(
        &mut self,
        vibration_type: VibrationType,
        path: Option<&str>,
    ) -> NotiResult<()> {
        validate_user_path(vibration_type == VibrationType::UserData, path, "vibration")?;
        self.vibration_type = vibration_type;
        self.vibration_path = path.map(str::to_string);
        Ok(())
    }

    pub fn vibration(&self) -> (VibrationType, Option<&str>) {
        (self.vibration_type, self.vibration_path.as_deref())
    }

    pub fn set_led(&mut self, operation: LedOperation, argb: i32) {
        self.led_operation = operation;
        self.led_argb = argb;
    }

    pub fn led(&self) -> (LedOperation, i32) {
        (self.led_operation, self.led_argb)
    }

    pub fn set_led_time_period(&mut self, on_ms: i32, off_ms: i32) -> NotiResult<()> {
        if on_ms < 0 || off_ms < 0 {
            return Err(NotiError::invalid("led on/off durations cannot be negative"));
        }
        self.led_on_ms = on_ms;
        self.led_off_ms = off_ms;
        Ok(())
    }

    pub fn led_time_period(&self) -> (i32, i32) {
        (self.led_on_ms, self.led_off_ms)
    }

    /// Sets the application-visible time in epoch seconds.
    pub fn set_time(&mut self, epoch_secs: i64) -> NotiResult<()> {
        if epoch_secs < 0 {
            return Err(NotiError::invalid("time cannot be negative"));
        }
        self.time = epoch_secs;
        Ok(())
    }

    pub fn set_time_now(&mut self) {
        self.time = now_epoch_secs();
    }

    pub fn time(&self) -> i64 {
        self.time
    }

    /// Time the store accepted the record, in epoch seconds.
    pub fn insert_time(&self) -> i64 {
        self.insert_time
    }

    pub fn set_property(&mut self, property: PropertyFlags) {
        self.property = property;
    }

    pub fn property(&self) -> PropertyFlags {
        self.property
    }

    pub fn set_display_applist(&mut self, applist: DisplayApplist) {
        self.display_applist = applist;
    }

    pub fn display_applist(&self) -> DisplayApplist {
        self.display_applist
    }

    pub fn set_progress_size(&mut self, size: f64) -> NotiResult<()> {
        if !size.is_finite() || size < 0.0 {
            return Err(NotiError::invalid("progress size must be a non-negative number"));
        }
        self.progress_size = size;
        Ok(())
    }

    pub fn progress_size(&self) -> f64 {
        self.progress_size
    }

    /// Sets progress as a fraction; values outside `0.0..=1.0` are clamped.
    pub fn set_progress_percentage(&mut self, percentage: f64) -> NotiResult<()> {
        if !percentage.is_finite() {
            return Err(NotiError::invalid("progress percentage must be finite"));
        }
        self.progress_percentage = percentage.clamp(0.0, 1.0);
        Ok(())
    }

    pub fn progress_percentage(&self) -> f64 {
        self.progress_percentage
    }

    pub fn set_tag(&mut self, tag: Option<&str>) {
        self.tag = tag.map(str::to_string);
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn set_ongoing_flag(&mut self, ongoing: bool) {
        self.ongoing_flag = ongoing;
    }

    pub fn ongoing_flag(&self) -> bool {
        self.ongoing_flag
    }

    pub fn set_auto_remove(&mut self, auto_remove: bool) {
        self.auto_remove = auto_remove;
    }

    pub fn auto_remove(&self) -> bool {
        self.auto_remove
    }

    pub fn uid(&self) -> i32 {
        self.uid
    }

    /// Fills display-only caches; these never travel over the wire.
    pub fn set_display_cache(&mut self, app_name: Option<&str>, app_icon: Option<&str>) {
        self.cache = DisplayCache {
            app_name: app_name.map(str::to_string),
            app_icon: app_icon.map(str::to_string),
        };
    }

    pub fn display_cache(&self) -> &DisplayCache {
        &self.cache
    }

    /// Whether this record must be hidden when no SIM card is present.
    pub fn is_sim_mode_only(&self) -> bool {
        self.property.contains(PropertyFlags::DISPLAY_ONLY_SIMMODE)
    }

    /// Key rows with `GROUP_ID_DEFAULT` are grouped by.
    ///
    /// Falls back from the title localization key to the plain title text to
    /// the caller package.
    pub fn title_key(&self) -> Option<&str> {
        self.text_key(TextSlot::Title)
            .or_else(|| self.text_raw(TextSlot::Title))
            .or(self.caller_package.as_deref())
    }
}

pub(crate) fn now_epoch_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs() as i64)
}

fn slot_index(slot: ExecuteSlot) -> usize {
    slot.as_raw() as usize
}

fn bundle_entry<'a>(bundle: Option<&'a Bundle>, key: &str) -> Option<&'a str> {
    bundle.and_then(|bundle| bundle.get(key))
}

fn set_bundle_entry(bundle: &mut Option<Bundle>, key: &str, value: Option<&str>) {
    match value {
        Some(value) => {
            bundle.get_or_insert_with(Bundle::new).insert(key, value);
        }
        None => {
            if let Some(existing) = bundle.as_mut() {
                existing.remove(key);
                if existing.is_empty() {
                    *bundle = None;
                }
            }
        }
    }
}

fn validate_user_path(requires_path: bool, path: Option<&str>, what: &str) -> NotiResult<()> {
    match path {
        Some(value) if value.trim().is_empty() => {
            Err(NotiError::invalid(format!("{what} path cannot be blank")))
        }
        None if requires_path => Err(NotiError::invalid(format!(
            "{what} type user_data requires a path"
        ))),
        _ => Ok(()),
    }
}
