use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=BITCOINKERNEL_LIB_DIR");
    println!("cargo:rerun-if-env-changed=BITCOINKERNEL_STATIC");

    // An explicit directory override takes precedence over pkg-config so a
    // locally built libbitcoinkernel can be picked up without installing it.
    if let Ok(dir) = env::var("BITCOINKERNEL_LIB_DIR") {
        let dir = PathBuf::from(dir);
        println!("cargo:rustc-link-search=native={}", dir.display());
        link_kernel();
        return;
    }

    match pkg_config::Config::new().probe("libbitcoinkernel") {
        Ok(_) => {}
        Err(err) => {
            println!(
                "cargo:warning=libbitcoinkernel not found via pkg-config ({}), \
                 falling back to plain -lbitcoinkernel",
                err
            );
            link_kernel();
        }
    }

    let target = env::var("TARGET").unwrap();
    if target.contains("apple") {
        println!("cargo:rustc-link-lib=c++");
    } else if !target.contains("msvc") {
        println!("cargo:rustc-link-lib=stdc++");
    }
}

fn link_kernel() {
    if env::var("BITCOINKERNEL_STATIC").is_ok() {
        println!("cargo:rustc-link-lib=static=bitcoinkernel");
    } else {
        println!("cargo:rustc-link-lib=bitcoinkernel");
    }
}
