/// Serde helper storing a `DateTime<Utc>` as unix seconds, which is how JWT
/// `iat`/`exp` claims are represented.
pub mod date_time_as_unix_seconds {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(date.timestamp())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let seconds = i64::deserialize(deserializer)?;
        Utc.timestamp_opt(seconds, 0)
            .single()
            .ok_or_else(|| serde::de::Error::custom("timestamp out of range"))
    }
}
