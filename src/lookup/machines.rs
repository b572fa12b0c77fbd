//! Machine (architecture) names and their ELF audit-arch constants.

use std::fmt;
use std::sync::OnceLock;

/// A machine type the interpreter knows how to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Machine {
    X86,
    X86_64,
    Ia64,
    Ppc64,
    Ppc,
    S390x,
    S390,
    Alpha,
    Aarch64,
    Arm,
}

// AUDIT_ARCH_* values: EM_* machine number plus the 64-bit and
// little-endian convention bits.
const ARCH_I386: u32 = 0x4000_0003;
const ARCH_X86_64: u32 = 0xc000_003e;
const ARCH_IA64: u32 = 0xc000_0032;
const ARCH_PPC64: u32 = 0x8000_0015;
const ARCH_PPC: u32 = 0x0000_0014;
const ARCH_S390X: u32 = 0x8000_0016;
const ARCH_S390: u32 = 0x0000_0016;
const ARCH_ALPHA: u32 = 0xc000_9026;
const ARCH_AARCH64: u32 = 0xc000_00b7;
const ARCH_ARM: u32 = 0x4000_0028;

impl Machine {
    /// Map an ELF audit-arch constant (the `arch=` field) to a machine.
    pub fn from_elf(arch: u32) -> Option<Self> {
        match arch {
            ARCH_I386 => Some(Self::X86),
            ARCH_X86_64 => Some(Self::X86_64),
            ARCH_IA64 => Some(Self::Ia64),
            ARCH_PPC64 => Some(Self::Ppc64),
            ARCH_PPC => Some(Self::Ppc),
            ARCH_S390X => Some(Self::S390x),
            ARCH_S390 => Some(Self::S390),
            ARCH_ALPHA => Some(Self::Alpha),
            ARCH_AARCH64 => Some(Self::Aarch64),
            ARCH_ARM => Some(Self::Arm),
            _ => None,
        }
    }

    /// The ELF audit-arch constant for this machine.
    pub fn elf(self) -> u32 {
        match self {
            Self::X86 => ARCH_I386,
            Self::X86_64 => ARCH_X86_64,
            Self::Ia64 => ARCH_IA64,
            Self::Ppc64 => ARCH_PPC64,
            Self::Ppc => ARCH_PPC,
            Self::S390x => ARCH_S390X,
            Self::S390 => ARCH_S390,
            Self::Alpha => ARCH_ALPHA,
            Self::Aarch64 => ARCH_AARCH64,
            Self::Arm => ARCH_ARM,
        }
    }

    /// Map a `uname -m` style name to a machine.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "i386" | "i486" | "i586" | "i686" => Some(Self::X86),
            "x86_64" => Some(Self::X86_64),
            "ia64" => Some(Self::Ia64),
            "ppc64" | "ppc64le" => Some(Self::Ppc64),
            "ppc" => Some(Self::Ppc),
            "s390x" => Some(Self::S390x),
            "s390" => Some(Self::S390),
            "alpha" => Some(Self::Alpha),
            "aarch64" => Some(Self::Aarch64),
            "armv7l" | "armeb" => Some(Self::Arm),
            _ => None,
        }
    }

    /// Canonical display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::X86 => "i386",
            Self::X86_64 => "x86_64",
            Self::Ia64 => "ia64",
            Self::Ppc64 => "ppc64",
            Self::Ppc => "ppc",
            Self::S390x => "s390x",
            Self::S390 => "s390",
            Self::Alpha => "alpha",
            Self::Aarch64 => "aarch64",
            Self::Arm => "armv7l",
        }
    }

    /// The machine this process runs on, from `uname(2)`.
    ///
    /// Queried once per process; later calls return the cached answer.
    pub fn host() -> Option<Self> {
        *HOST_MACHINE.get_or_init(|| {
            let uts = nix::sys::utsname::uname().ok()?;
            let machine = Self::from_name(uts.machine().to_str()?);
            tracing::debug!("Host machine: {machine:?}");
            machine
        })
    }
}

static HOST_MACHINE: OnceLock<Option<Machine>> = OnceLock::new();

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
