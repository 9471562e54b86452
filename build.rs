fn main() {
    // Rebuild when the embedded frontend page changes.
    println!("cargo:rerun-if-changed=web");
}
