fn main() {
    // ESP-IDF builds need the sysenv forwarded to rustc; host builds need nothing.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
