fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // The GStreamer framework installer for macOS puts everything under
    // /Library/Frameworks; link against it and find it again at runtime.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("macos") {
        println!("cargo:rustc-link-search=framework=/Library/Frameworks");
        println!(
            "cargo:rustc-link-arg=-Wl,-rpath,/Library/Frameworks/GStreamer.framework/Versions/1.0/lib"
        );
    }
}
