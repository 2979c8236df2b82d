use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-env-changed=NVIDIA_NGX_SDK_PATH");
    println!("cargo:rerun-if-changed=build.rs");

    // Declarations compile without the SDK; only linking needs it.
    if env::var_os("CARGO_FEATURE_LINK").is_none() {
        return Ok(());
    }

    // --- NVIDIA NGX SDK Path ---
    let sdk_path = match env::var("NVIDIA_NGX_SDK_PATH") {
        Ok(p) => PathBuf::from(p),
        Err(_) => {
            panic!("ngx-sys `link` feature enabled but NVIDIA_NGX_SDK_PATH is not set. Point it at the DLSS SDK root (the directory containing `lib/`).");
        }
    };

    if !sdk_path.exists() {
        panic!("NVIDIA NGX SDK path does not exist: {}", sdk_path.display());
    }

    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let (lib_dir, lib_name) = if target_os == "windows" {
        // The SDK ships both a /MT (`_s`) and /MD (`_d`) variant; Rust links the dynamic CRT.
        (sdk_path.join("lib").join("Windows_x86_64").join("x86_64"), "nvsdk_ngx_d")
    } else {
        (sdk_path.join("lib").join("Linux_x86_64"), "nvsdk_ngx")
    };

    if !lib_dir.exists() {
        panic!("NVIDIA NGX SDK library path does not exist: {}. Verify the SDK layout (lib/Windows_x86_64/x86_64 or lib/Linux_x86_64).", lib_dir.display());
    }

    println!("cargo:rustc-link-search=native={}", lib_dir.display());
    println!("cargo:rustc-link-lib=static={}", lib_name);
    if target_os == "linux" {
        // libnvsdk_ngx.a is C++ and pulls in the C++ runtime plus dlopen.
        println!("cargo:rustc-link-lib=dylib=stdc++");
        println!("cargo:rustc-link-lib=dylib=dl");
    }

    Ok(())
}
