use std::fs;
use std::process::{Command, Output};

fn pgtune(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pgtune"))
        .args(args)
        .env_remove("PGTUNE_CPUS")
        .output()
        .expect("Failed to execute pgtune")
}

#[test]
fn test_print_recommendations() {
    let output = pgtune(&["--cpus", "6", "-q"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "max_worker_processes = 6\nmax_parallel_workers_per_gather = 3\nmax_parallel_workers = 6\n"
    );
}

#[test]
fn test_one_cpu_fails() {
    let output = pgtune(&["--cpus", "1"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("cannot make recommendations with just 1 CPU"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn test_cpus_from_env() {
    let output = Command::new(env!("CARGO_BIN_EXE_pgtune"))
        .args(["-q"])
        .env("PGTUNE_CPUS", "4")
        .output()
        .expect("Failed to execute pgtune");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("max_parallel_workers_per_gather = 2"));
}

#[test]
fn test_rewrite_conf_file() {
    let dir = tempfile::tempdir().unwrap();
    let conf = dir.path().join("postgresql.conf");
    fs::write(
        &conf,
        "shared_buffers = 128MB\n#max_worker_processes = 8\t\t# (change requires restart)\n",
    )
    .unwrap();

    let output = pgtune(&["--cpus", "10", "--conf-path", conf.to_str().unwrap()]);
    assert!(output.status.success());

    let written = fs::read_to_string(&conf).unwrap();
    assert_eq!(
        written,
        "shared_buffers = 128MB\n\
         max_worker_processes = 10\t# (change requires restart)\n\
         max_parallel_workers_per_gather = 5\n\
         max_parallel_workers = 10\n"
    );
}

#[test]
fn test_dry_run_and_out_path() {
    let dir = tempfile::tempdir().unwrap();
    let conf = dir.path().join("postgresql.conf");
    let out = dir.path().join("tuned.conf");
    fs::write(&conf, "max_parallel_workers = 8\n").unwrap();

    let output = pgtune(&["--cpus", "3", "--conf-path", conf.to_str().unwrap(), "--dry-run"]);
    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&conf).unwrap(), "max_parallel_workers = 8\n");
    assert!(String::from_utf8_lossy(&output.stdout).contains("+ max_parallel_workers = 3"));

    let output = pgtune(&[
        "--cpus",
        "3",
        "--conf-path",
        conf.to_str().unwrap(),
        "--out-path",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&conf).unwrap(), "max_parallel_workers = 8\n");
    assert!(fs::read_to_string(&out).unwrap().contains("max_parallel_workers = 3\n"));
}

#[test]
fn test_out_path_requires_conf_path() {
    let output = pgtune(&["--cpus", "4", "--out-path", "/tmp/unused.conf"]);
    assert!(!output.status.success());
}

#[test]
fn test_dry_run_requires_conf_path() {
    let output = pgtune(&["--cpus", "4", "--dry-run"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--dry-run requires --conf-path"));
}

#[test]
fn test_tuned_conf_left_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let conf = dir.path().join("postgresql.conf");
    let original = "max_worker_processes = 4\r\n\
                    max_parallel_workers_per_gather = 2\r\n\
                    max_parallel_workers = 4";
    fs::write(&conf, original).unwrap();
    let mtime = fs::metadata(&conf).unwrap().modified().unwrap();

    let output = pgtune(&["--cpus", "4", "--conf-path", conf.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("is already tuned"));

    assert_eq!(fs::read_to_string(&conf).unwrap(), original);
    assert_eq!(fs::metadata(&conf).unwrap().modified().unwrap(), mtime);
}

#[test]
fn test_max_cpus_does_not_overflow() {
    let output = pgtune(&["--cpus", "9223372036854775807", "-q"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout)
        .contains("max_parallel_workers_per_gather = 4611686018427387904"));
}
