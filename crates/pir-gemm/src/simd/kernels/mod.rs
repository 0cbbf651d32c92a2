//! Architecture-specific packed microkernels.

#[cfg(target_arch = "x86_64")]
mod avx2;

#[cfg(target_arch = "x86_64")]
pub use avx2::Avx2Microkernel;

pub use crate::core::PortableMicrokernel;
