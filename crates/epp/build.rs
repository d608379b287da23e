/// Build provenance shown by `epp version --extended`.
const PROVENANCE: [(&str, &str); 3] = [
    ("TARGET", "EPP_BUILD_TARGET"),
    ("PROFILE", "EPP_BUILD_PROFILE"),
    ("CARGO_CFG_TARGET_ENV", "EPP_BUILD_TARGET_ENV"),
];

fn main() {
    for (source, exported) in PROVENANCE {
        let value = std::env::var(source).unwrap_or_else(|_| "unknown".to_string());
        println!("cargo:rustc-env={exported}={value}");
        println!("cargo:rerun-if-env-changed={source}");
    }
}
