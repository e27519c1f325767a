//! Build script for air-ticker.

use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rustc-check-cfg=cfg(rust_analyzer)");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("cargo sets CARGO_MANIFEST_DIR"));
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("cargo sets OUT_DIR"));

    // 1) Build-time station settings read through `option_env!`
    for name in [
        "WIFI_SSID",
        "WIFI_PASSWORD",
        "AIR_TICKER_PM_SENSOR",
        "AIR_TICKER_TEMP_SENSOR",
    ] {
        println!("cargo:rerun-if-env-changed={name}");
    }

    // 2) CYW43 firmware blobs (43439A0.bin, 43439A0_clm.bin) for the `wifi` feature
    println!("cargo:rerun-if-env-changed=CYW43_FIRMWARE_DIR");
    let firmware_dir = env::var("CYW43_FIRMWARE_DIR")
        .map_or_else(|_| manifest_dir.join("cyw43-firmware"), PathBuf::from);
    println!("cargo:rustc-env=CYW43_FIRMWARE_DIR={}", firmware_dir.display());

    // 3) Handle memory.x based on target
    let target = env::var("TARGET").expect("cargo sets TARGET");
    if target.starts_with("thumbv6m") {
        // Pico W: copy memory.x to OUT_DIR and add the cortex-m-rt and defmt linker scripts
        let memory_x = fs::read_to_string(manifest_dir.join("memory.x"))
            .expect("Failed to read memory.x");
        fs::write(out_dir.join("memory.x"), memory_x).expect("Failed to write memory.x");
        println!("cargo:rustc-link-search={}", out_dir.display());
        println!("cargo:rerun-if-changed=memory.x");
        println!("cargo:rustc-link-arg-bins=--nmagic");
        println!("cargo:rustc-link-arg-bins=-Tlink.x");
        println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }
}
