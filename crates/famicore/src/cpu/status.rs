use bitflags::bitflags;

bitflags! {
    /// The 8-bit processor status register (P).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// N V _ B D I Z C
    /// ```
    /// `D` has no arithmetic effect on this CPU; `B` exists only in pushed
    /// copies of the register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        /// Carry: set by additions that carry out of bit 7 and subtractions
        /// that do not borrow.
        const CARRY     = 0b0000_0001;
        /// Zero: set when a result is zero.
        const ZERO      = 0b0000_0010;
        /// Interrupt disable: masks IRQ while set.
        const INTERRUPT = 0b0000_0100;
        /// Decimal mode: storable, but arithmetic ignores it on this chip.
        const DECIMAL   = 0b0000_1000;
        /// Break: only present in the copies of P pushed by BRK/PHP.
        const BREAK     = 0b0001_0000;
        /// Bit 5 always reads back as 1.
        const UNUSED    = 0b0010_0000;
        /// Overflow: signed overflow of the last add/subtract, or bit 6 of
        /// the operand for BIT.
        const OVERFLOW  = 0b0100_0000;
        /// Negative: bit 7 of the last result.
        const NEGATIVE  = 0b1000_0000;
    }
}

impl Status {
    /// Updates Z and N from an 8-bit result.
    #[inline]
    pub fn set_zn(&mut self, value: u8) {
        self.set(Status::ZERO, value == 0);
        self.set(Status::NEGATIVE, value & 0x80 != 0);
    }

    #[inline]
    pub fn c(&self) -> bool {
        self.contains(Status::CARRY)
    }

    #[inline]
    pub fn z(&self) -> bool {
        self.contains(Status::ZERO)
    }

    #[inline]
    pub fn i(&self) -> bool {
        self.contains(Status::INTERRUPT)
    }

    #[inline]
    pub fn v(&self) -> bool {
        self.contains(Status::OVERFLOW)
    }

    #[inline]
    pub fn n(&self) -> bool {
        self.contains(Status::NEGATIVE)
    }
}
