fn main() {
    // Propagate the ESP-IDF build environment (toolchain paths, sysroot,
    // linker args) when building for the espidf target. On host builds
    // this emits nothing.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
