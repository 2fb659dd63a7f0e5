//! DS3231 real-time clock (I2C)
//!
//! The DS3231 is a temperature-compensated RTC with a battery backup.
//! Time registers are BCD encoded:
//!
//! | Reg  | Contents                                   |
//! |------|--------------------------------------------|
//! | 0x00 | Seconds 00-59                              |
//! | 0x01 | Minutes 00-59                              |
//! | 0x02 | Hours (bit 6 = 12h mode, bit 5 = PM)       |
//! | 0x03 | Day of week 1-7                            |
//! | 0x04 | Date 01-31                                 |
//! | 0x05 | Month 01-12 (bit 7 = century)              |
//! | 0x06 | Year 00-99                                 |
//!
//! The oscillator-stop flag (OSF) in the status register is set when
//! the clock lost power and its time can no longer be trusted.

use embedded_hal::i2c::{ErrorKind, I2c};
use heliostat_core::traits::{ClockError, ClockSource, DateTime};

/// DS3231 I2C address (fixed)
pub const DS3231_ADDR: u8 = 0x68;

/// DS3231 register addresses
pub mod reg {
    /// Seconds
    pub const SECONDS: u8 = 0x00;
    /// Control
    pub const CONTROL: u8 = 0x0E;
    /// Control/status flags
    pub const STATUS: u8 = 0x0F;
}

/// Register bit masks
mod bits {
    /// Hours register: 12-hour mode
    pub const HOUR_12: u8 = 0x40;
    /// Hours register: PM flag in 12-hour mode
    pub const PM: u8 = 0x20;
    /// Month register: century rollover
    pub const CENTURY: u8 = 0x80;
    /// Status register: oscillator stopped
    pub const OSF: u8 = 0x80;
    /// Control register: oscillator disabled on battery (active low)
    pub const EOSC: u8 = 0x80;
}

/// Number of time-keeping registers starting at 0x00
const TIME_REGS: usize = 7;

/// Years representable with the century bit
const MIN_YEAR: u16 = 2000;
const MAX_YEAR: u16 = 2199;

/// DS3231 driver
pub struct Ds3231<I2C> {
    i2c: I2C,
}

impl<I2C> Ds3231<I2C>
where
    I2C: I2c,
{
    /// Create a new DS3231 driver
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Release the bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Set the clock
    ///
    /// Also clears the oscillator-stop flag, since the time is now valid.
    pub fn adjust(&mut self, t: &DateTime) -> Result<(), ClockError> {
        if !t.is_valid() || !(MIN_YEAR..=MAX_YEAR).contains(&t.year) {
            return Err(ClockError::InvalidData);
        }

        let offset = t.year - MIN_YEAR;
        let century = if offset >= 100 { bits::CENTURY } else { 0 };

        let frame = [
            reg::SECONDS,
            to_bcd(t.second),
            to_bcd(t.minute),
            to_bcd(t.hour), // 24-hour mode
            day_of_week(t.year, t.month, t.day) + 1,
            to_bcd(t.day),
            to_bcd(t.month) | century,
            to_bcd((offset % 100) as u8),
        ];
        self.i2c.write(DS3231_ADDR, &frame).map_err(map_bus_error)?;

        let status = self.read_register(reg::STATUS)?;
        self.write_register(reg::STATUS, status & !bits::OSF)
    }

    /// Check if the oscillator stopped since the clock was last set
    pub fn lost_power(&mut self) -> Result<bool, ClockError> {
        Ok(self.read_register(reg::STATUS)? & bits::OSF != 0)
    }

    fn read_register(&mut self, addr: u8) -> Result<u8, ClockError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(DS3231_ADDR, &[addr], &mut buf)
            .map_err(map_bus_error)?;
        Ok(buf[0])
    }

    fn write_register(&mut self, addr: u8, value: u8) -> Result<(), ClockError> {
        self.i2c
            .write(DS3231_ADDR, &[addr, value])
            .map_err(map_bus_error)
    }
}

impl<I2C> ClockSource for Ds3231<I2C>
where
    I2C: I2c,
{
    fn begin(&mut self) -> Result<(), ClockError> {
        let control = self.read_register(reg::CONTROL)?;

        // Keep the oscillator running on battery
        if control & bits::EOSC != 0 {
            self.write_register(reg::CONTROL, control & !bits::EOSC)?;
        }
        Ok(())
    }

    fn now(&mut self) -> Result<DateTime, ClockError> {
        let mut regs = [0u8; TIME_REGS];
        self.i2c
            .write_read(DS3231_ADDR, &[reg::SECONDS], &mut regs)
            .map_err(map_bus_error)?;
        decode(&regs)
    }
}

/// Decode the seven time-keeping registers
fn decode(regs: &[u8; TIME_REGS]) -> Result<DateTime, ClockError> {
    let second = from_bcd(regs[0] & 0x7F)?;
    let minute = from_bcd(regs[1] & 0x7F)?;

    let hour = if regs[2] & bits::HOUR_12 != 0 {
        let h = from_bcd(regs[2] & 0x1F)?;
        if !(1..=12).contains(&h) {
            return Err(ClockError::InvalidData);
        }
        let pm = regs[2] & bits::PM != 0;
        (h % 12) + if pm { 12 } else { 0 }
    } else {
        from_bcd(regs[2] & 0x3F)?
    };

    let day = from_bcd(regs[4] & 0x3F)?;
    let month = from_bcd(regs[5] & 0x1F)?;
    let century = if regs[5] & bits::CENTURY != 0 { 100 } else { 0 };
    let year = MIN_YEAR + century + from_bcd(regs[6])? as u16;

    let t = DateTime::new(year, month, day, hour, minute, second);
    if t.is_valid() {
        Ok(t)
    } else {
        Err(ClockError::InvalidData)
    }
}

fn from_bcd(value: u8) -> Result<u8, ClockError> {
    let (tens, ones) = (value >> 4, value & 0x0F);
    if tens > 9 || ones > 9 {
        return Err(ClockError::InvalidData);
    }
    Ok(tens * 10 + ones)
}

fn to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Day of week, 0 = Sunday
fn day_of_week(year: u16, month: u8, day: u8) -> u8 {
    const OFFSETS: [u16; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
    let y = if month < 3 { year - 1 } else { year };
    let dow = y + y / 4 - y / 100 + y / 400 + OFFSETS[(month - 1) as usize] + day as u16;
    (dow % 7) as u8
}

fn map_bus_error<E: embedded_hal::i2c::Error>(e: E) -> ClockError {
    match e.kind() {
        ErrorKind::NoAcknowledge(_) => ClockError::NotPresent,
        _ => ClockError::Bus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorType, NoAcknowledgeSource, Operation};
    use proptest::prelude::*;

    #[derive(Debug)]
    struct MockError(ErrorKind);

    impl embedded_hal::i2c::Error for MockError {
        fn kind(&self) -> ErrorKind {
            self.0
        }
    }

    /// Register-file model of the chip
    struct MockBus {
        regs: [u8; 0x13],
        pointer: usize,
        present: bool,
        fail: bool,
    }

    impl MockBus {
        fn new() -> Self {
            Self {
                regs: [0; 0x13],
                pointer: 0,
                present: true,
                fail: false,
            }
        }
    }

    impl ErrorType for MockBus {
        type Error = MockError;
    }

    impl I2c for MockBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if !self.present || address != DS3231_ADDR {
                return Err(MockError(ErrorKind::NoAcknowledge(
                    NoAcknowledgeSource::Address,
                )));
            }
            if self.fail {
                return Err(MockError(ErrorKind::ArbitrationLoss));
            }

            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        if let Some((first, rest)) = bytes.split_first() {
                            self.pointer = *first as usize;
                            for b in rest {
                                self.regs[self.pointer] = *b;
                                self.pointer += 1;
                            }
                        }
                    }
                    Operation::Read(buf) => {
                        for b in buf.iter_mut() {
                            *b = self.regs[self.pointer];
                            self.pointer += 1;
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_decode_24_hour() {
        let mut bus = MockBus::new();
        bus.regs[..7].copy_from_slice(&[0x45, 0x30, 0x07, 0x04, 0x15, 0x01, 0x25]);

        let mut rtc = Ds3231::new(bus);
        assert_eq!(rtc.now(), Ok(DateTime::new(2025, 1, 15, 7, 30, 45)));
    }

    #[test]
    fn test_decode_12_hour() {
        let mut bus = MockBus::new();
        // 12:05 AM and 04:30 PM
        bus.regs[..7].copy_from_slice(&[0x00, 0x05, 0x52, 0x01, 0x01, 0x06, 0x25]);
        let mut rtc = Ds3231::new(bus);
        assert_eq!(rtc.now().unwrap().hour, 0);

        let mut bus = rtc.release();
        bus.regs[1] = 0x30;
        bus.regs[2] = 0x40 | 0x20 | 0x04;
        let mut rtc = Ds3231::new(bus);
        assert_eq!(rtc.now().unwrap().minute_of_day(), 990);
    }

    #[test]
    fn test_century_bit() {
        let mut bus = MockBus::new();
        bus.regs[..7].copy_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x01, 0x81, 0x00]);
        let mut rtc = Ds3231::new(bus);
        assert_eq!(rtc.now().unwrap().year, 2100);
    }

    #[test]
    fn test_garbage_registers_rejected() {
        let mut bus = MockBus::new();
        bus.regs[..7].copy_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x01, 0x13, 0x25]);
        let mut rtc = Ds3231::new(bus);
        assert_eq!(rtc.now(), Err(ClockError::InvalidData));

        let mut bus = rtc.release();
        bus.regs[5] = 0x01;
        bus.regs[0] = 0x5A; // Not BCD
        let mut rtc = Ds3231::new(bus);
        assert_eq!(rtc.now(), Err(ClockError::InvalidData));
    }

    #[test]
    fn test_begin_missing_device() {
        let mut bus = MockBus::new();
        bus.present = false;
        let mut rtc = Ds3231::new(bus);
        assert_eq!(rtc.begin(), Err(ClockError::NotPresent));
    }

    #[test]
    fn test_begin_enables_oscillator() {
        let mut bus = MockBus::new();
        bus.regs[reg::CONTROL as usize] = 0x9C;
        let mut rtc = Ds3231::new(bus);

        assert_eq!(rtc.begin(), Ok(()));
        assert_eq!(rtc.release().regs[reg::CONTROL as usize], 0x1C);
    }

    #[test]
    fn test_bus_fault() {
        let mut bus = MockBus::new();
        bus.fail = true;
        let mut rtc = Ds3231::new(bus);
        assert_eq!(rtc.now(), Err(ClockError::Bus));
    }

    #[test]
    fn test_adjust_clears_lost_power() {
        let mut bus = MockBus::new();
        bus.regs[reg::STATUS as usize] = bits::OSF | 0x08;
        let mut rtc = Ds3231::new(bus);

        assert_eq!(rtc.lost_power(), Ok(true));

        let t = DateTime::new(2025, 6, 21, 13, 45, 10);
        rtc.adjust(&t).unwrap();

        assert_eq!(rtc.lost_power(), Ok(false));
        assert_eq!(rtc.now(), Ok(t));

        let bus = rtc.release();
        assert_eq!(bus.regs[reg::STATUS as usize], 0x08);
        // 2025-06-21 is a Saturday
        assert_eq!(bus.regs[3], 7);
    }

    #[test]
    fn test_adjust_rejects_out_of_range() {
        let mut rtc = Ds3231::new(MockBus::new());
        assert_eq!(
            rtc.adjust(&DateTime::new(1999, 1, 1, 0, 0, 0)),
            Err(ClockError::InvalidData)
        );
        assert_eq!(
            rtc.adjust(&DateTime::new(2025, 2, 1, 24, 0, 0)),
            Err(ClockError::InvalidData)
        );
    }

    #[test]
    fn test_day_of_week() {
        assert_eq!(day_of_week(2000, 1, 1), 6); // Saturday
        assert_eq!(day_of_week(2025, 1, 15), 3); // Wednesday
        assert_eq!(day_of_week(2024, 2, 29), 4); // Thursday
    }

    proptest! {
        #[test]
        fn prop_adjust_then_read(
            year in 2000u16..=2199,
            month in 1u8..=12,
            day in 1u8..=28,
            hour in 0u8..24,
            minute in 0u8..60,
            second in 0u8..60,
        ) {
            let t = DateTime::new(year, month, day, hour, minute, second);
            let mut rtc = Ds3231::new(MockBus::new());
            rtc.adjust(&t).unwrap();
            prop_assert_eq!(rtc.now(), Ok(t));
        }
    }
}
