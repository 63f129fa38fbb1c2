//! Key names used by the Tomcat region launcher.

/// JDK location; the launcher falls back to `JAVA_HOME` when blank.
pub const COMMON_JAVA_HOME: &str = "common.java.home";

/// Extra JVM options appended to `JAVA_OPTS`.
pub const COMMON_JAVA_OPTIONS: &str = "common.java.options";

/// Tomcat installation; the launcher falls back to `CATALINA_HOME`.
pub const COMMON_TOMCAT_LOCATION: &str = "common.tomcat.location";

/// Per-region keys, written as `<region>.<suffix>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegionKey {
    WarLocation,
    BsHomeLocation,
    ShutdownPort,
    HttpPort,
    HttpsPort,
    JmxPort,
    AjpPort,
}

impl RegionKey {
    pub const ALL: [RegionKey; 7] = [
        RegionKey::WarLocation,
        RegionKey::BsHomeLocation,
        RegionKey::ShutdownPort,
        RegionKey::HttpPort,
        RegionKey::HttpsPort,
        RegionKey::JmxPort,
        RegionKey::AjpPort,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            RegionKey::WarLocation => "war.location",
            RegionKey::BsHomeLocation => "bshome.location",
            RegionKey::ShutdownPort => "shutdown.port",
            RegionKey::HttpPort => "http.port",
            RegionKey::HttpsPort => "https.port",
            RegionKey::JmxPort => "jmx.port",
            RegionKey::AjpPort => "ajp.port",
        }
    }
}

/// Full key for `which` inside `region`, e.g. `dev.http.port`.
pub fn region_key(region: &str, which: RegionKey) -> String {
    format!("{region}.{}", which.suffix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_keys_are_prefixed() {
        assert_eq!(region_key("dev", RegionKey::WarLocation), "dev.war.location");
        assert_eq!(region_key("prod", RegionKey::AjpPort), "prod.ajp.port");
        let all: Vec<_> = RegionKey::ALL.iter().map(|k| region_key("r", *k)).collect();
        assert_eq!(
            all,
            [
                "r.war.location",
                "r.bshome.location",
                "r.shutdown.port",
                "r.http.port",
                "r.https.port",
                "r.jmx.port",
                "r.ajp.port",
            ]
        );
    }
}
