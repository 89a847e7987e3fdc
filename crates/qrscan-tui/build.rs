//! Build script to embed Info.plist into the macOS binary.
//!
//! Without an embedded NSCameraUsageDescription, macOS kills a signed binary
//! the first time it touches the camera.

fn main() {
    #[cfg(target_os = "macos")]
    {
        let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") else {
            return;
        };
        let info_plist_path = format!("{}/../../scripts/Info.plist", manifest_dir);

        if std::path::Path::new(&info_plist_path).exists() {
            println!(
                "cargo:rustc-link-arg=-Wl,-sectcreate,__TEXT,__info_plist,{}",
                info_plist_path
            );
            println!("cargo:rerun-if-changed={}", info_plist_path);
        } else {
            println!(
                "cargo:warning=Info.plist not found at {}, camera access may not work",
                info_plist_path
            );
        }
    }
}
