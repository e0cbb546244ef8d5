use stress_test::{stress_test_commit_cycles, stress_test_rollback, stress_test_scaling};
use tracing_subscriber::EnvFilter;


const SEED: u64 = 0x5EED;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║            MONITOR STRESS TESTS                            ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    let mut passed = true;

    // Test 1: shallow documents
    let stats = stress_test_rollback(200, 20, 2, SEED);
    stats.print();
    passed &= stats.passed();

    // Test 2: deep documents
    let stats = stress_test_rollback(200, 60, 5, SEED + 1);
    stats.print();
    passed &= stats.passed();

    // Test 3: commit/rollback cycles
    let stats = stress_test_commit_cycles(500, 10, 3, SEED + 2);
    stats.print();
    passed &= stats.passed();

    // Test 4: scaling analysis
    passed &= stress_test_scaling(8, 2, SEED + 3);

    if passed {
        println!("\n✓ All stress tests completed successfully!");
    } else {
        println!("\n✗ Stress tests found mismatches");
        std::process::exit(1);
    }
}
