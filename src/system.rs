use log::debug;

/// Resources observed on the machine being tuned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemInfo {
    pub cpus: i64,
}

impl SystemInfo {
    pub fn detect(cpus_override: Option<i64>) -> Self {
        let cpus = cpus_override.unwrap_or_else(|| {
            let cpus = num_cpus::get() as i64;
            debug!("detected {} logical cpus", cpus);
            cpus
        });

        if cpus_override.is_some() {
            debug!("using cpu count override of {}", cpus);
        }

        Self { cpus }
    }
}
