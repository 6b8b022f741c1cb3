use std::fmt;
use std::str::FromStr;

/// Which compute device the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DevicePolicy {
    /// Prefer the accelerator, fall back to CPU.
    #[default]
    Auto,
    Cpu,
    Gpu,
}

/// The device the engine is actually loaded on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Accelerator,
    Cpu,
}

impl Device {
    pub fn use_gpu(self) -> bool {
        self == Device::Accelerator
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Accelerator => write!(f, "gpu"),
            Device::Cpu => write!(f, "cpu"),
        }
    }
}

impl FromStr for DevicePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(DevicePolicy::Auto),
            "cpu" => Ok(DevicePolicy::Cpu),
            "gpu" | "cuda" => Ok(DevicePolicy::Gpu),
            other => Err(format!(
                "unknown device '{other}', expected one of: auto, cpu, gpu"
            )),
        }
    }
}

/// Whether whisper.cpp was built with an accelerator backend.
pub fn accelerator_available() -> bool {
    cfg!(any(feature = "cuda", feature = "metal"))
}

/// Resolve a policy to a concrete device.
///
/// `Gpu` is honoured even without a compiled backend; whisper.cpp then
/// falls back to CPU on its own and logs it.
pub fn select_device(policy: DevicePolicy) -> Device {
    select_device_with(policy, accelerator_available())
}

fn select_device_with(policy: DevicePolicy, accelerator: bool) -> Device {
    match policy {
        DevicePolicy::Cpu => Device::Cpu,
        DevicePolicy::Gpu => Device::Accelerator,
        DevicePolicy::Auto if accelerator => Device::Accelerator,
        DevicePolicy::Auto => Device::Cpu,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::auto_with_gpu(DevicePolicy::Auto, true, Device::Accelerator)]
    #[case::auto_without_gpu(DevicePolicy::Auto, false, Device::Cpu)]
    #[case::forced_cpu(DevicePolicy::Cpu, true, Device::Cpu)]
    #[case::forced_gpu(DevicePolicy::Gpu, false, Device::Accelerator)]
    fn test_select_device(
        #[case] policy: DevicePolicy,
        #[case] accelerator: bool,
        #[case] expected: Device,
    ) {
        assert_eq!(select_device_with(policy, accelerator), expected);
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!("AUTO".parse::<DevicePolicy>(), Ok(DevicePolicy::Auto));
        assert_eq!("cuda".parse::<DevicePolicy>(), Ok(DevicePolicy::Gpu));
        assert!("tpu".parse::<DevicePolicy>().is_err());
    }

    #[test]
    fn test_default_policy_is_auto() {
        assert_eq!(DevicePolicy::default(), DevicePolicy::Auto);
    }

    #[test]
    fn test_device_display() {
        assert_eq!(Device::Accelerator.to_string(), "gpu");
        assert_eq!(Device::Cpu.to_string(), "cpu");
        assert!(Device::Accelerator.use_gpu());
        assert!(!Device::Cpu.use_gpu());
    }
}
