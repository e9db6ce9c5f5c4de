//! Reads the real host through sysinfo.
use statlog_agent::{Sampler, SysinfoSampler};

#[test]
fn sysinfo_sampler_reads_host() {
    let mut sampler = SysinfoSampler::new();
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);

    let first = sampler.read().expect("first read");
    assert!(first.timestamp.is_some());
    assert!(first.memory_total > 0.0);
    assert!(first.memory_used <= first.memory_total);
    assert!(
        (0.0..=100.0 + 1e-3).contains(&first.cpu_usage),
        "cpu out of range: {}",
        first.cpu_usage
    );

    // Later reads measure from the previous one; they must keep working.
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    let second = sampler.read().expect("second read");
    assert!(second.timestamp >= first.timestamp);
}
