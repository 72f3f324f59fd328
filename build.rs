fn main() {
    println!("cargo:rerun-if-env-changed=GREENGUARD_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=GREENGUARD_WIFI_PASSWORD");
    println!("cargo:rerun-if-env-changed=GREENGUARD_SERVER_URL");
    println!("cargo:rerun-if-env-changed=GREENGUARD_SENSOR_ID");
    println!("cargo:rerun-if-env-changed=GREENGUARD_LOCATION");
    println!("cargo:rerun-if-env-changed=GREENGUARD_SENSOR_KIND");
    println!("cargo:rerun-if-env-changed=GREENGUARD_SENSOR_GPIO");
    println!("cargo:rerun-if-env-changed=GREENGUARD_PUBLISH_INTERVAL_MS");
    println!("cargo:rerun-if-env-changed=GREENGUARD_REQUEST_TIMEOUT_MS");

    // ESP-IDF link arguments are only needed for the firmware image;
    // host test builds skip them.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
