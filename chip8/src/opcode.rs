//! Instruction decoding.
use std::fmt;

/// Raw 16-bit instruction word, with helpers for extracting operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode(pub u16);

impl Opcode {
    #[inline(always)]
    pub fn from_bytes([a, b]: [u8; 2]) -> Self {
        Self(((a as u16) << 8) | b as u16)
    }

    /// Instruction family, the upper nibble.
    #[inline(always)]
    pub fn op(self) -> u8 {
        ((self.0 & 0xF000) >> 12) as u8
    }

    /// Operand X register, bits 8-11.
    #[inline(always)]
    pub fn x(self) -> u8 {
        ((self.0 & 0x0F00) >> 8) as u8
    }

    /// Operand Y register, bits 4-7.
    #[inline(always)]
    pub fn y(self) -> u8 {
        ((self.0 & 0x00F0) >> 4) as u8
    }

    /// Operand N, the lowest nibble.
    #[inline(always)]
    pub fn n(self) -> u8 {
        (self.0 & 0x000F) as u8
    }

    /// Operand NN, the lowest byte.
    #[inline(always)]
    pub fn nn(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    /// Operand NNN, a 12-bit address.
    #[inline(always)]
    pub fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }

    #[inline(always)]
    pub fn nibbles(self) -> (u8, u8, u8, u8) {
        (self.op(), self.x(), self.y(), self.n())
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

/// Register index, 0x0-0xF.
pub type Reg = u8;

/// Decoded instruction.
///
/// Every valid pattern of the base instruction set maps to exactly one variant.
/// Anything else fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instr {
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 1nnn
    Jump(u16),
    /// 2nnn
    Call(u16),
    /// 3xnn
    SkipEqByte(Reg, u8),
    /// 4xnn
    SkipNeByte(Reg, u8),
    /// 5xy0
    SkipEqReg(Reg, Reg),
    /// 6xnn
    LoadByte(Reg, u8),
    /// 7xnn
    AddByte(Reg, u8),
    /// 8xy0
    Load(Reg, Reg),
    /// 8xy1
    Or(Reg, Reg),
    /// 8xy2
    And(Reg, Reg),
    /// 8xy3
    Xor(Reg, Reg),
    /// 8xy4
    Add(Reg, Reg),
    /// 8xy5
    Sub(Reg, Reg),
    /// 8xy6
    Shr(Reg, Reg),
    /// 8xy7
    SubN(Reg, Reg),
    /// 8xyE
    Shl(Reg, Reg),
    /// 9xy0
    SkipNeReg(Reg, Reg),
    /// Annn
    LoadIndex(u16),
    /// Bnnn
    JumpOffset(u16),
    /// Cxnn
    Random(Reg, u8),
    /// Dxyn
    Draw(Reg, Reg, u8),
    /// Ex9E
    SkipKeyDown(Reg),
    /// ExA1
    SkipKeyUp(Reg),
    /// Fx07
    LoadDelay(Reg),
    /// Fx0A
    WaitKey(Reg),
    /// Fx15
    SetDelay(Reg),
    /// Fx18
    SetSound(Reg),
    /// Fx1E
    AddIndex(Reg),
    /// Fx29
    LoadGlyph(Reg),
    /// Fx33
    StoreBcd(Reg),
    /// Fx55
    StoreRegs(Reg),
    /// Fx65
    LoadRegs(Reg),
}

impl Instr {
    /// Decode an instruction word. Returns `None` for patterns outside the instruction set.
    pub fn decode(opcode: Opcode) -> Option<Self> {
        use Instr::*;

        let (x, y, n, nn, nnn) = (opcode.x(), opcode.y(), opcode.n(), opcode.nn(), opcode.nnn());

        let instr = match opcode.nibbles() {
            (0x0, 0x0, 0xE, 0x0) => Cls,
            (0x0, 0x0, 0xE, 0xE) => Ret,
            (0x1, ..) => Jump(nnn),
            (0x2, ..) => Call(nnn),
            (0x3, ..) => SkipEqByte(x, nn),
            (0x4, ..) => SkipNeByte(x, nn),
            (0x5, .., 0x0) => SkipEqReg(x, y),
            (0x6, ..) => LoadByte(x, nn),
            (0x7, ..) => AddByte(x, nn),
            (0x8, .., 0x0) => Load(x, y),
            (0x8, .., 0x1) => Or(x, y),
            (0x8, .., 0x2) => And(x, y),
            (0x8, .., 0x3) => Xor(x, y),
            (0x8, .., 0x4) => Add(x, y),
            (0x8, .., 0x5) => Sub(x, y),
            (0x8, .., 0x6) => Shr(x, y),
            (0x8, .., 0x7) => SubN(x, y),
            (0x8, .., 0xE) => Shl(x, y),
            (0x9, .., 0x0) => SkipNeReg(x, y),
            (0xA, ..) => LoadIndex(nnn),
            (0xB, ..) => JumpOffset(nnn),
            (0xC, ..) => Random(x, nn),
            (0xD, ..) => Draw(x, y, n),
            (0xE, _, 0x9, 0xE) => SkipKeyDown(x),
            (0xE, _, 0xA, 0x1) => SkipKeyUp(x),
            (0xF, _, 0x0, 0x7) => LoadDelay(x),
            (0xF, _, 0x0, 0xA) => WaitKey(x),
            (0xF, _, 0x1, 0x5) => SetDelay(x),
            (0xF, _, 0x1, 0x8) => SetSound(x),
            (0xF, _, 0x1, 0xE) => AddIndex(x),
            (0xF, _, 0x2, 0x9) => LoadGlyph(x),
            (0xF, _, 0x3, 0x3) => StoreBcd(x),
            (0xF, _, 0x5, 0x5) => StoreRegs(x),
            (0xF, _, 0x6, 0x5) => LoadRegs(x),
            _ => return None,
        };

        Some(instr)
    }
}

/// Mnemonic form, used by instruction tracing.
#[rustfmt::skip]
impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instr::*;

        match *self {
            Cls                 => write!(f, "CLS"),
            Ret                 => write!(f, "RET"),
            Jump(nnn)           => write!(f, "JP   {nnn:03X}"),
            Call(nnn)           => write!(f, "CALL {nnn:03X}"),
            SkipEqByte(x, nn)   => write!(f, "SE   V{x:X}, {nn:02X}"),
            SkipNeByte(x, nn)   => write!(f, "SNE  V{x:X}, {nn:02X}"),
            SkipEqReg(x, y)     => write!(f, "SE   V{x:X}, V{y:X}"),
            LoadByte(x, nn)     => write!(f, "LD   V{x:X}, {nn:02X}"),
            AddByte(x, nn)      => write!(f, "ADD  V{x:X}, {nn:02X}"),
            Load(x, y)          => write!(f, "LD   V{x:X}, V{y:X}"),
            Or(x, y)            => write!(f, "OR   V{x:X}, V{y:X}"),
            And(x, y)           => write!(f, "AND  V{x:X}, V{y:X}"),
            Xor(x, y)           => write!(f, "XOR  V{x:X}, V{y:X}"),
            Add(x, y)           => write!(f, "ADD  V{x:X}, V{y:X}"),
            Sub(x, y)           => write!(f, "SUB  V{x:X}, V{y:X}"),
            Shr(x, y)           => write!(f, "SHR  V{x:X}, V{y:X}"),
            SubN(x, y)          => write!(f, "SUBN V{x:X}, V{y:X}"),
            Shl(x, y)           => write!(f, "SHL  V{x:X}, V{y:X}"),
            SkipNeReg(x, y)     => write!(f, "SNE  V{x:X}, V{y:X}"),
            LoadIndex(nnn)      => write!(f, "LD   I, {nnn:03X}"),
            JumpOffset(nnn)     => write!(f, "JP   V0, {nnn:03X}"),
            Random(x, nn)       => write!(f, "RND  V{x:X}, {nn:02X}"),
            Draw(x, y, n)       => write!(f, "DRW  V{x:X}, V{y:X}, {n:X}"),
            SkipKeyDown(x)      => write!(f, "SKP  V{x:X}"),
            SkipKeyUp(x)        => write!(f, "SKNP V{x:X}"),
            LoadDelay(x)        => write!(f, "LD   V{x:X}, DT"),
            WaitKey(x)          => write!(f, "LD   V{x:X}, K"),
            SetDelay(x)         => write!(f, "LD   DT, V{x:X}"),
            SetSound(x)         => write!(f, "LD   ST, V{x:X}"),
            AddIndex(x)         => write!(f, "ADD  I, V{x:X}"),
            LoadGlyph(x)        => write!(f, "LD   F, V{x:X}"),
            StoreBcd(x)         => write!(f, "LD   B, V{x:X}"),
            StoreRegs(x)        => write!(f, "LD   [I], V{x:X}"),
            LoadRegs(x)         => write!(f, "LD   V{x:X}, [I]"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_operand_fields() {
        let op = Opcode::from_bytes([0xD1, 0x2F]);
        assert_eq!(op.0, 0xD12F);
        assert_eq!(op.op(), 0xD);
        assert_eq!(op.x(), 0x1);
        assert_eq!(op.y(), 0x2);
        assert_eq!(op.n(), 0xF);
        assert_eq!(op.nn(), 0x2F);
        assert_eq!(op.nnn(), 0x12F);
    }

    #[test]
    fn test_decode() {
        use Instr::*;

        assert_eq!(Instr::decode(Opcode(0x00E0)), Some(Cls));
        assert_eq!(Instr::decode(Opcode(0x00EE)), Some(Ret));
        assert_eq!(Instr::decode(Opcode(0x1ABC)), Some(Jump(0xABC)));
        assert_eq!(Instr::decode(Opcode(0x8AB4)), Some(Add(0xA, 0xB)));
        assert_eq!(Instr::decode(Opcode(0x8ABE)), Some(Shl(0xA, 0xB)));
        assert_eq!(Instr::decode(Opcode(0xD015)), Some(Draw(0, 1, 5)));
        assert_eq!(Instr::decode(Opcode(0xE39E)), Some(SkipKeyDown(3)));
        assert_eq!(Instr::decode(Opcode(0xF265)), Some(LoadRegs(2)));
    }

    #[test]
    fn test_decode_unknown() {
        for word in [
            0x0000, 0x0123, 0x00E1, 0x5121, 0x8008, 0x800F, 0x9001, 0xE000, 0xE19F, 0xF000,
            0xF1FF, 0xF266,
        ] {
            assert_eq!(Instr::decode(Opcode(word)), None, "{word:04X}");
        }
    }

    /// Each instruction family accepts exactly the documented number of patterns
    /// when the operand nibbles are held fixed.
    #[test]
    fn test_decode_coverage() {
        let decoded = (0..=u16::MAX)
            .filter(|w| Instr::decode(Opcode(*w)).is_some())
            .count();

        let expected = 2 // 00E0, 00EE
            + 6 * 0x1000 // 1nnn 2nnn 3xnn 4xnn 6xnn 7xnn
            + 4 * 0x1000 // Annn Bnnn Cxnn Dxyn
            + 0x100 // 5xy0
            + 9 * 0x100 // 8xy0-7, 8xyE
            + 0x100 // 9xy0
            + 2 * 0x10 // Ex9E ExA1
            + 9 * 0x10; // Fx07 .. Fx65

        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_mnemonic() {
        assert_eq!(Instr::Draw(0, 1, 5).to_string(), "DRW  V0, V1, 5");
        assert_eq!(Instr::LoadIndex(0x202).to_string(), "LD   I, 202");
    }
}
