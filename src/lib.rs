#![cfg_attr(not(test), no_std)]


pub use rtcc::{
  DateTimeAccess, NaiveDate, NaiveDateTime, Datelike, Timelike,
};

use core::convert::Infallible;
use core::fmt::Write;
use core::sync::atomic::{AtomicBool, Ordering};

use heapless::String;
use log::{debug, trace};

// Width of the text panel in characters, two rows assumed.
const PANEL_COLS: usize = 16;

// Day-of-week names, 1=Sunday..7=Saturday, 0 is undefined.
const DOW_NAMES: [&str; 8] =
  ["---", "Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Day of week code to display name. Out-of-range codes render as undefined.
pub fn dow_name(code: u8) -> &'static str {
  let code = if code > 7 { 0 } else { code };
  DOW_NAMES[usize::from(code)]
}

// Single-character string for one decimal digit, for slot redraws.
fn digit_str(digit: u8) -> &'static str {
  const DIGITS: &str = "0123456789";
  let i = usize::from(digit.min(9));
  &DIGITS[i..=i]
}


/// One calendar/time-of-day value as whole decimal scalars.
/// Digit slots (see `Field`) are a view over these scalars,
/// never a separate representation.
/// - `dow` is 0..=7 where 1 is Sunday and 0 means undefined
/// - `pm` is carried for 12-hour display only; `hour` is always 0..=23
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockDateTime {
  pub dow: u8,
  pub year: u16,
  pub month: u8,
  pub day: u8,
  pub hour: u8,
  pub minute: u8,
  pub second: u8,
  pub pm: bool,
}

impl Default for ClockDateTime {
  fn default() -> Self {
    ClockDateTime {
      dow: 0,
      year: 2000,
      month: 1,
      day: 1,
      hour: 0,
      minute: 0,
      second: 0,
      pm: false,
    }
  }
}

impl ClockDateTime {
  /// Overwrite the digit addressed by `field` with `digit`,
  /// leaving every other digit of the owning scalar untouched.
  /// Returns the new scalar value of the owning field, or `Rejected`
  /// (and no mutation at all) if the digit fails the field's range check.
  pub fn apply_digit(&mut self, field: Field, digit: u8) -> Result<u16, Rejected> {
    if !field.accepts(self, digit) {
      trace!("reject {:?} digit {}", field, digit);
      return Err(Rejected);
    }
    let next = if field == Field::Dow {
      // day of week is a direct 1..=7 code, not a positional decimal
      u16::from(digit)
    } else {
      splice_digit(field.scalar(self), field.weight(), digit)
    };
    field.store(self, next);
    debug!("change {:?} -> {}", field, next);
    Ok(next)
  }

  /// Conversion to a chrono datetime, for handing to `DateTimeAccess`
  /// clock chips. Per-slot editing legally admits calendar-impossible
  /// dates (e.g. April 31), for which this returns `None`.
  pub fn try_to_naive(&self) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(
      i32::from(self.year), u32::from(self.month), u32::from(self.day))?
      .and_hms_opt(
        u32::from(self.hour), u32::from(self.minute), u32::from(self.second))
  }
}

impl From<NaiveDateTime> for ClockDateTime {
  fn from(dt: NaiveDateTime) -> Self {
    let hour = dt.hour() as u8;
    ClockDateTime {
      dow: dt.weekday().number_from_sunday() as u8,
      year: dt.year().clamp(0, 9999) as u16,
      month: dt.month() as u8,
      day: dt.day() as u8,
      hour,
      minute: dt.minute() as u8,
      second: dt.second() as u8,
      pm: hour >= 12,
    }
  }
}

/// A keystroke that failed its field's range check. The working value,
/// cursor and display are left exactly as they were.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rejected;

/// Splice `digit` into `value` at decimal position `weight`
/// (1, 10, 100 or 1000), without borrow or carry: all digits above and
/// below the targeted position are preserved.
pub fn splice_digit(value: u16, weight: u16, digit: u8) -> u16 {
  let upper = value / (weight * 10) * (weight * 10);
  let lower = value % weight;
  u16::from(digit) * weight + upper + lower
}

/// One cursor-addressable digit position of an edited value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
  Dow,
  YearThousands,
  YearHundreds,
  YearTens,
  YearUnits,
  MonthTens,
  MonthUnits,
  DayTens,
  DayUnits,
  HourTens,
  HourUnits,
  MinuteTens,
  MinuteUnits,
  SecondTens,
  SecondUnits,
}

impl Field {
  /// Decimal place value this field controls within its owning scalar.
  pub fn weight(self) -> u16 {
    match self {
      Field::YearThousands => 1000,
      Field::YearHundreds => 100,
      Field::YearTens
      | Field::MonthTens
      | Field::DayTens
      | Field::HourTens
      | Field::MinuteTens
      | Field::SecondTens => 10,
      _ => 1,
    }
  }

  /// Range check for overwriting this field's digit with `digit`,
  /// evaluated against the current (always in-range) value. Tens digits
  /// are clamped outright; units digits are checked combined with the
  /// tens digit already stored. No cross-field calendar validation.
  pub fn accepts(self, value: &ClockDateTime, digit: u8) -> bool {
    if digit > 9 {
      return false;
    }
    match self {
      Field::Dow => (1..=7).contains(&digit),
      Field::YearThousands => digit == 1 || digit == 2,
      Field::YearHundreds | Field::YearTens | Field::YearUnits => true,
      Field::MonthTens => digit <= 1,
      Field::MonthUnits => {
        u16::from(digit) + 10 * (u16::from(value.month) / 10) <= 12
      }
      Field::DayTens => digit <= 3,
      Field::DayUnits => {
        u16::from(digit) + 10 * (u16::from(value.day) / 10) <= 31
      }
      Field::HourTens => digit <= 2,
      Field::HourUnits => {
        u16::from(digit) + 10 * (u16::from(value.hour) / 10) <= 23
      }
      Field::MinuteTens | Field::SecondTens => digit <= 5,
      Field::MinuteUnits => {
        u16::from(digit) + 10 * (u16::from(value.minute) / 10) <= 59
      }
      Field::SecondUnits => {
        u16::from(digit) + 10 * (u16::from(value.second) / 10) <= 59
      }
    }
  }

  // Current whole value of the scalar this field belongs to.
  fn scalar(self, value: &ClockDateTime) -> u16 {
    match self {
      Field::Dow => u16::from(value.dow),
      Field::YearThousands
      | Field::YearHundreds
      | Field::YearTens
      | Field::YearUnits => value.year,
      Field::MonthTens | Field::MonthUnits => u16::from(value.month),
      Field::DayTens | Field::DayUnits => u16::from(value.day),
      Field::HourTens | Field::HourUnits => u16::from(value.hour),
      Field::MinuteTens | Field::MinuteUnits => u16::from(value.minute),
      Field::SecondTens | Field::SecondUnits => u16::from(value.second),
    }
  }

  // Store a new whole value into the scalar this field belongs to.
  fn store(self, value: &mut ClockDateTime, scalar: u16) {
    match self {
      Field::Dow => value.dow = scalar as u8,
      Field::YearThousands
      | Field::YearHundreds
      | Field::YearTens
      | Field::YearUnits => value.year = scalar,
      Field::MonthTens | Field::MonthUnits => value.month = scalar as u8,
      Field::DayTens | Field::DayUnits => value.day = scalar as u8,
      Field::HourTens | Field::HourUnits => value.hour = scalar as u8,
      Field::MinuteTens | Field::MinuteUnits => value.minute = scalar as u8,
      Field::SecondTens | Field::SecondUnits => value.second = scalar as u8,
    }
  }
}

/// A field together with its caret coordinate on the 16x2 panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSlot {
  pub field: Field,
  pub col: u8,
  pub row: u8,
}

/// Cursor-ordered slots for editing the full date/time value.
/// Coordinates follow the `Sun 2023-08-29` / `13:45:59` panel layout.
pub const CLOCK_SLOTS: &[FieldSlot] = &[
  FieldSlot { field: Field::Dow, col: 0, row: 0 },
  FieldSlot { field: Field::YearThousands, col: 4, row: 0 },
  FieldSlot { field: Field::YearHundreds, col: 5, row: 0 },
  FieldSlot { field: Field::YearTens, col: 6, row: 0 },
  FieldSlot { field: Field::YearUnits, col: 7, row: 0 },
  FieldSlot { field: Field::MonthTens, col: 9, row: 0 },
  FieldSlot { field: Field::MonthUnits, col: 10, row: 0 },
  FieldSlot { field: Field::DayTens, col: 12, row: 0 },
  FieldSlot { field: Field::DayUnits, col: 13, row: 0 },
  FieldSlot { field: Field::HourTens, col: 0, row: 1 },
  FieldSlot { field: Field::HourUnits, col: 1, row: 1 },
  FieldSlot { field: Field::MinuteTens, col: 3, row: 1 },
  FieldSlot { field: Field::MinuteUnits, col: 4, row: 1 },
  FieldSlot { field: Field::SecondTens, col: 6, row: 1 },
  FieldSlot { field: Field::SecondUnits, col: 7, row: 1 },
];

/// Cursor-ordered slots for editing the alarm value (time of day only).
pub const ALARM_SLOTS: &[FieldSlot] = &[
  FieldSlot { field: Field::HourTens, col: 0, row: 1 },
  FieldSlot { field: Field::HourUnits, col: 1, row: 1 },
  FieldSlot { field: Field::MinuteTens, col: 3, row: 1 },
  FieldSlot { field: Field::MinuteUnits, col: 4, row: 1 },
  FieldSlot { field: Field::SecondTens, col: 6, row: 1 },
  FieldSlot { field: Field::SecondUnits, col: 7, row: 1 },
];

/// Cursor over a fixed-size ordered slot table.
/// `advance` wraps; `retreat` stops at slot 0 (backing off slot 1 or 0
/// lands on 0 rather than wrapping to the last slot, matching the
/// long-shipped panel behavior).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
  index: usize,
  count: usize,
}

impl Cursor {
  pub fn new(count: usize) -> Self {
    debug_assert!(count > 0);
    Cursor { index: 0, count }
  }

  pub fn index(&self) -> usize {
    self.index
  }

  pub fn advance(&mut self) {
    self.index = (self.index + 1) % self.count;
  }

  pub fn retreat(&mut self) {
    if self.index > 1 {
      self.index = (self.index - 1) % self.count;
    } else {
      self.index = 0;
    }
  }
}

/// One key of the 4x4 matrix keypad.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
  Digit(u8),
  A,
  B,
  C,
  D,
  Star,
  Hash,
}

impl Key {
  /// Map a keymap character (`'0'..='9'`, `'A'..='D'`, `'*'`, `'#'`)
  /// to a key, for keypad drivers that report characters.
  pub fn from_char(c: char) -> Option<Key> {
    match c {
      '0'..='9' => Some(Key::Digit(c as u8 - b'0')),
      'A' => Some(Key::A),
      'B' => Some(Key::B),
      'C' => Some(Key::C),
      'D' => Some(Key::D),
      '*' => Some(Key::Star),
      '#' => Some(Key::Hash),
      _ => None,
    }
  }
}


/// Authoritative source of the live time and the stored alarm value.
pub trait ClockSource {
  /// Error type
  type Error;

  /// Read the live date/time. Polled once per view-mode refresh.
  fn read(&mut self) -> Result<ClockDateTime, Self::Error>;

  /// Write the date/time back, once per committed edit.
  fn write(&mut self, value: &ClockDateTime) -> Result<(), Self::Error>;

  /// Read the stored alarm value.
  fn read_alarm(&mut self) -> Result<ClockDateTime, Self::Error>;

  /// Write the alarm value back, once per committed alarm edit.
  fn write_alarm(&mut self, value: &ClockDateTime) -> Result<(), Self::Error>;
}

/// Latched refresh-due event. One call checks and clears the latch,
/// so a `true` result is observed at most once per event.
pub trait AlarmSignal {
  /// Error type
  type Error;

  /// Return whether a refresh came due since the last call, clearing
  /// the internal latch if so.
  fn consume_due_flag(&mut self) -> Result<bool, Self::Error>;
}

/// Debounced matrix keypad.
pub trait Keypad {
  /// Error type
  type Error;

  /// Return at most one newly pressed key per call.
  fn poll_key(&mut self) -> Result<Option<Key>, Self::Error>;
}

/// Two-line character panel with a positionable caret, HD44780 style:
/// text is written at the current caret position.
pub trait TextPanel {
  /// Error type
  type Error;

  /// Move the caret.
  fn set_caret(&mut self, col: u8, row: u8) -> Result<(), Self::Error>;

  /// Show or hide the blinking insertion caret.
  fn caret_visible(&mut self, visible: bool) -> Result<(), Self::Error>;

  /// Write text at the caret.
  fn write_text(&mut self, text: &str) -> Result<(), Self::Error>;
}


/// Interrupt-safe refresh latch. `raise` may be called from an ISR or
/// callback; the main loop consumes it through the `AlarmSignal` impl
/// on `&Latch`. The latch is the only datum shared across that boundary.
pub struct Latch {
  due: AtomicBool,
}

impl Latch {
  pub const fn new() -> Self {
    Latch { due: AtomicBool::new(false) }
  }

  /// Mark a refresh as due.
  pub fn raise(&self) {
    self.due.store(true, Ordering::Release);
  }

  /// Consume the latch, returning whether it was raised.
  pub fn take(&self) -> bool {
    self.due.swap(false, Ordering::AcqRel)
  }
}

impl Default for Latch {
  fn default() -> Self {
    Latch::new()
  }
}

impl AlarmSignal for &Latch {
  type Error = Infallible;

  fn consume_due_flag(&mut self) -> Result<bool, Self::Error> {
    Ok(self.take())
  }
}

/// Synchronous-poll delivery: the closure asks the timing device
/// directly whether the event fired.
pub struct PolledSignal<F> {
  poll: F,
}

impl<F> PolledSignal<F> {
  pub fn new(poll: F) -> Self {
    PolledSignal { poll }
  }
}

impl<F, E> AlarmSignal for PolledSignal<F>
  where
    F: FnMut() -> Result<bool, E>,
{
  type Error = E;

  fn consume_due_flag(&mut self) -> Result<bool, Self::Error> {
    (self.poll)()
  }
}

/// Poll-with-callback delivery: each check runs the registered poll
/// routine, which raises the shared latch when the event fired; the
/// latch is then consumed.
pub struct CallbackSignal<F> {
  latch: Latch,
  poll: F,
}

impl<F> CallbackSignal<F> {
  pub fn new(poll: F) -> Self {
    CallbackSignal { latch: Latch::new(), poll }
  }
}

impl<F, E> AlarmSignal for CallbackSignal<F>
  where
    F: FnMut(&Latch) -> Result<(), E>,
{
  type Error = E;

  fn consume_due_flag(&mut self) -> Result<bool, Self::Error> {
    (self.poll)(&self.latch)?;
    Ok(self.latch.take())
  }
}


/// Error from a `DateTimeAccess`-backed clock source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceError<E> {
  /// Underlying device error
  Device(E),
  /// The working value has no calendar representation (e.g. April 31)
  InvalidDateTime,
}

/// `ClockSource` adapter over any `rtcc::DateTimeAccess` device
/// (ds323x-class RTC drivers and similar). The alarm value is kept in
/// adapter memory; alarm registers are too chip-specific to abstract here.
pub struct RtccSource<T> {
  device: T,
  alarm: ClockDateTime,
}

impl<T> RtccSource<T> {
  pub fn new(device: T) -> Self {
    RtccSource { device, alarm: ClockDateTime::default() }
  }

  /// Give the wrapped device back.
  pub fn release(self) -> T {
    self.device
  }
}

impl<T, E> ClockSource for RtccSource<T>
  where
    T: DateTimeAccess<Error = E>,
{
  type Error = SourceError<E>;

  fn read(&mut self) -> Result<ClockDateTime, Self::Error> {
    let dt = self.device.datetime().map_err(SourceError::Device)?;
    Ok(dt.into())
  }

  fn write(&mut self, value: &ClockDateTime) -> Result<(), Self::Error> {
    let dt = value.try_to_naive().ok_or(SourceError::InvalidDateTime)?;
    self.device.set_datetime(&dt).map_err(SourceError::Device)
  }

  fn read_alarm(&mut self) -> Result<ClockDateTime, Self::Error> {
    Ok(self.alarm)
  }

  fn write_alarm(&mut self, value: &ClockDateTime) -> Result<(), Self::Error> {
    self.alarm = *value;
    Ok(())
  }
}


/// Optional capabilities of the panel, matching the feature spread of
/// the shipped clock units.
#[derive(Clone, Copy, Debug)]
pub struct Features {
  /// Alarm view and alarm editing are available (key `B`).
  pub alarm: bool,
  /// Leaving an edit writes the working value back to the clock source.
  pub commit_on_exit: bool,
  /// Append an am/pm suffix to the time row.
  pub twelve_hour: bool,
}

impl Default for Features {
  fn default() -> Self {
    Features { alarm: true, commit_on_exit: true, twelve_hour: false }
  }
}

/// Top-level display/edit state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
  /// Live time view
  Normal,
  /// Editing a working copy of the time
  EditTime,
  /// Stored alarm view
  Alarm,
  /// Editing a working copy of the alarm
  EditAlarm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EditTarget {
  Time,
  Alarm,
}

// Working copy of one edited value plus the cursor over its slot table.
// Exists only while an edit mode is active; at most one at a time.
struct EditSession {
  target: EditTarget,
  value: ClockDateTime,
  cursor: Cursor,
}

impl EditSession {
  fn new(target: EditTarget, value: ClockDateTime) -> Self {
    let count = match target {
      EditTarget::Time => CLOCK_SLOTS.len(),
      EditTarget::Alarm => ALARM_SLOTS.len(),
    };
    EditSession { target, value, cursor: Cursor::new(count) }
  }

  fn slots(&self) -> &'static [FieldSlot] {
    match self.target {
      EditTarget::Time => CLOCK_SLOTS,
      EditTarget::Alarm => ALARM_SLOTS,
    }
  }

  fn slot(&self) -> FieldSlot {
    self.slots()[self.cursor.index()]
  }
}

/// The clock panel state machine: routes keys to the digit editor and
/// the cursor, owns the single edit session, and refreshes the live
/// view when the tick signal comes due.
///
/// All four collaborators share one error type, which `poll` propagates.
pub struct ClockUi<CLK, SIG, KEY, PNL> {
  clock: CLK,
  signal: SIG,
  keypad: KEY,
  panel: PNL,
  features: Features,
  mode: Mode,
  session: Option<EditSession>,
}

impl<CLK, SIG, KEY, PNL, E> ClockUi<CLK, SIG, KEY, PNL>
  where
    CLK: ClockSource<Error = E>,
    SIG: AlarmSignal<Error = E>,
    KEY: Keypad<Error = E>,
    PNL: TextPanel<Error = E>,
{
  /// New panel with the default (full) feature set.
  pub fn new(clock: CLK, signal: SIG, keypad: KEY, panel: PNL) -> Self {
    Self::with_features(clock, signal, keypad, panel, Features::default())
  }

  pub fn with_features(
    clock: CLK, signal: SIG, keypad: KEY, panel: PNL, features: Features,
  ) -> Self {
    ClockUi {
      clock,
      signal,
      keypad,
      panel,
      features,
      mode: Mode::Normal,
      session: None,
    }
  }

  pub fn mode(&self) -> Mode {
    self.mode
  }

  pub fn editing(&self) -> bool {
    self.session.is_some()
  }

  /// One cooperative loop iteration: service at most one key, then,
  /// outside edit modes, one refresh-due check. Nothing here blocks.
  pub fn poll(&mut self) -> Result<(), E> {
    if let Some(key) = self.keypad.poll_key()? {
      debug!("key {:?}", key);
      self.handle_key(key)?;
    }
    if self.session.is_none() && self.signal.consume_due_flag()? {
      self.refresh()?;
    }
    Ok(())
  }

  /// Route one keystroke. Digits go to the editor, `*`/`#` to the
  /// cursor (both only act on an active session), `A` toggles editing
  /// of the mode's value, `B` toggles the alarm view.
  pub fn handle_key(&mut self, key: Key) -> Result<(), E> {
    match key {
      Key::Digit(digit) => self.edit_digit(digit),
      Key::A => self.toggle_edit(),
      Key::B => self.toggle_alarm_view(),
      Key::C | Key::D => {
        debug!("key {:?} reserved", key);
        Ok(())
      }
      Key::Star => self.navigate(false),
      Key::Hash => self.navigate(true),
    }
  }

  /// Redraw the current view from its source value. Called on the tick
  /// signal and after leaving an edit; a no-op while editing.
  pub fn refresh(&mut self) -> Result<(), E> {
    match self.mode {
      Mode::Normal => {
        let now = self.clock.read()?;
        self.draw(&now, false)
      }
      Mode::Alarm => {
        let alarm = self.clock.read_alarm()?;
        self.draw(&alarm, true)
      }
      // the edit session owns the panel until it ends
      Mode::EditTime | Mode::EditAlarm => Ok(()),
    }
  }

  fn edit_digit(&mut self, digit: u8) -> Result<(), E> {
    let Some(session) = self.session.as_mut() else {
      return Ok(());
    };
    let slot = session.slot();
    if session.value.apply_digit(slot.field, digit).is_err() {
      // rejected: value, cursor and caret all stay put
      return Ok(());
    }
    // redraw just the edited slot, then park the caret on the next one
    self.panel.set_caret(slot.col, slot.row)?;
    if slot.field == Field::Dow {
      self.panel.write_text(dow_name(session.value.dow))?;
    } else {
      self.panel.write_text(digit_str(digit))?;
    }
    session.cursor.advance();
    let next = session.slot();
    self.panel.set_caret(next.col, next.row)
  }

  fn navigate(&mut self, forward: bool) -> Result<(), E> {
    let Some(session) = self.session.as_mut() else {
      // no session, no cursor: navigation keys are inert in view modes
      return Ok(());
    };
    if forward {
      session.cursor.advance();
    } else {
      session.cursor.retreat();
    }
    let slot = session.slot();
    self.panel.set_caret(slot.col, slot.row)
  }

  fn toggle_edit(&mut self) -> Result<(), E> {
    match self.mode {
      Mode::Normal => self.enter_edit(EditTarget::Time),
      Mode::EditTime => self.exit_edit(Mode::Normal),
      Mode::Alarm => self.enter_edit(EditTarget::Alarm),
      Mode::EditAlarm => self.exit_edit(Mode::Alarm),
    }
  }

  fn toggle_alarm_view(&mut self) -> Result<(), E> {
    if !self.features.alarm {
      return Ok(());
    }
    match self.mode {
      Mode::Normal => {
        self.mode = Mode::Alarm;
        self.refresh()
      }
      Mode::Alarm => {
        self.mode = Mode::Normal;
        self.refresh()
      }
      // preview key is ignored while editing
      Mode::EditTime | Mode::EditAlarm => Ok(()),
    }
  }

  // Snapshot the target value, show it, and start a session with the
  // cursor on slot 0 and the caret visible.
  fn enter_edit(&mut self, target: EditTarget) -> Result<(), E> {
    let value = match target {
      EditTarget::Time => self.clock.read()?,
      EditTarget::Alarm => self.clock.read_alarm()?,
    };
    self.mode = match target {
      EditTarget::Time => Mode::EditTime,
      EditTarget::Alarm => Mode::EditAlarm,
    };
    debug!("enter {:?}", self.mode);
    let session = EditSession::new(target, value);
    self.draw(&value, target == EditTarget::Alarm)?;
    let slot = session.slot();
    self.panel.set_caret(slot.col, slot.row)?;
    self.panel.caret_visible(true)?;
    self.session = Some(session);
    Ok(())
  }

  // End the session: write the working value back (unless configured
  // otherwise), hide the caret and fall back to the live view.
  // There is no cancel path.
  fn exit_edit(&mut self, back: Mode) -> Result<(), E> {
    if let Some(session) = self.session.take() {
      if self.features.commit_on_exit {
        match session.target {
          EditTarget::Time => self.clock.write(&session.value)?,
          EditTarget::Alarm => self.clock.write_alarm(&session.value)?,
        }
        debug!("commit {:?}", session.target);
      } else {
        debug!("discard {:?}", session.target);
      }
    }
    self.panel.caret_visible(false)?;
    self.mode = back;
    self.refresh()
  }

  // Full two-line redraw of one value; both rows padded to the panel
  // width so mode switches leave no stale characters.
  fn draw(&mut self, value: &ClockDateTime, alarm_view: bool) -> Result<(), E> {
    let mut line: String<PANEL_COLS> = String::new();
    if alarm_view {
      let _ = line.push_str("Alarm");
    } else {
      let _ = write!(
        line,
        "{} {:04}-{:02}-{:02}",
        dow_name(value.dow), value.year, value.month, value.day,
      );
    }
    pad_line(&mut line);
    self.panel.set_caret(0, 0)?;
    self.panel.write_text(&line)?;

    line.clear();
    let _ = write!(
      line, "{:02}:{:02}:{:02}", value.hour, value.minute, value.second,
    );
    if self.features.twelve_hour && !alarm_view {
      let _ = line.push_str(if value.pm { " pm" } else { " am" });
    }
    pad_line(&mut line);
    self.panel.set_caret(0, 1)?;
    self.panel.write_text(&line)
  }
}

fn pad_line(line: &mut String<PANEL_COLS>) {
  while line.push(' ').is_ok() {}
}
