use log::{warn, info};

/// Host memory snapshot, taken once at startup.
pub struct MemoryTopology {
    total_ram: u64,
    available_ram: u64,
    page_size: u64,
}

impl MemoryTopology {
    /// Detects the system's memory configuration.
    pub fn detect() -> Self {
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        let total_pages = unsafe { libc::sysconf(libc::_SC_PHYS_PAGES) };
        let av_pages = unsafe { libc::sysconf(libc::_SC_AVPHYS_PAGES) };

        let page_size = if page_size <= 0 {
            warn!("Failed to detect page size via libc. Fallback to 4096.");
            4096
        } else {
            page_size as u64
        };
        let total_ram = total_pages.max(0) as u64 * page_size;
        let available_ram = av_pages.max(0) as u64 * page_size;

        Self { total_ram, available_ram, page_size }
    }

    pub fn total_ram(&self) -> u64 {
        self.total_ram
    }

    /// Returns the available RAM in bytes, 0 if unknown.
    pub fn available_ram(&self) -> u64 {
        self.available_ram
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn print_summary(&self) {
        info!("Memory topology: {:.2} GB RAM total ({:.2} GB available), {} byte pages.",
            self.total_ram as f64 / 1e9,
            self.available_ram as f64 / 1e9,
            self.page_size
        );
    }

    /// Would `demand` bytes on top of what is in use push the host past its free RAM?
    pub fn exceeds_available(&self, demand: u64) -> bool {
        self.available_ram > 0 && demand > self.available_ram
    }
}
