//! 日期转换
//!
//! 内存记录与线上记录之间只在 `date` 字段上有差别：
//! - 发出：有效时间点序列化为规范时间戳，无效则省略
//! - 接收：可解析的时间戳转为时间点，缺失或无法解析则为空
//!
//! 规范时间戳精确到毫秒，接收时多余的精度直接截断，
//! 因此有效时间点往返后与原值相等

use chrono::{
    DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Timelike, Utc,
};

const NANOS_PER_MILLI: u32 = 1_000_000;

use crate::models::{Aktien, AktienDto};

/// 序列化为规范时间戳，如 `2020-02-03T00:00:00.000Z`
///
/// 以下情况视为无效，返回 `None`：
/// - 年份超出四位数范围
/// - 带有毫秒以下的精度（先用 [`truncate_to_millis`] 对齐）
pub fn serialize_date(date: &DateTime<Utc>) -> Option<String> {
    if !(0..=9999).contains(&date.year()) {
        return None;
    }
    if date.nanosecond() % NANOS_PER_MILLI != 0 {
        log::warn!("日期 {} 精度超过毫秒，无法无损序列化", date);
        return None;
    }
    Some(date.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// 截断到整毫秒
pub fn truncate_to_millis(date: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = date.nanosecond();
    date.with_nanosecond(nanos - nanos % NANOS_PER_MILLI)
        .unwrap_or(date)
}

/// 解析后端返回的时间戳
///
/// 支持 RFC 3339、不带时区的日期时间（按 UTC）以及纯日期（当日零点 UTC）
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(truncate_to_millis(date.with_timezone(&Utc)));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(truncate_to_millis(Utc.from_utc_datetime(&naive)));
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return day.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
    }

    log::warn!("无法解析日期 {:?}，按空值处理", raw);
    None
}

/// 内存记录 → 线上记录
pub fn to_wire(aktien: &Aktien) -> AktienDto {
    AktienDto {
        id: aktien.id,
        symbol: aktien.symbol.clone(),
        date: aktien.date.as_ref().and_then(serialize_date),
        open: aktien.open,
        close: aktien.close,
        high: aktien.high,
        low: aktien.low,
        volume: aktien.volume,
    }
}

/// 线上记录 → 内存记录
pub fn from_wire(dto: AktienDto) -> Aktien {
    Aktien {
        id: dto.id,
        symbol: dto.symbol,
        date: dto.date.as_deref().and_then(parse_date),
        open: dto.open,
        close: dto.close,
        high: dto.high,
        low: dto.low,
        volume: dto.volume,
    }
}

pub fn from_wire_all(dtos: Vec<AktienDto>) -> Vec<Aktien> {
    dtos.into_iter().map(from_wire).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_serialize_canonical_format() {
        let date = Utc.with_ymd_and_hms(2020, 2, 3, 0, 0, 0).unwrap();
        assert_eq!(serialize_date(&date).as_deref(), Some("2020-02-03T00:00:00.000Z"));
    }

    #[test]
    fn test_round_trip_keeps_instant() {
        let base = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        let samples = [
            base,
            base + Duration::milliseconds(1),
            Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 59).unwrap() + Duration::milliseconds(999),
            Utc.with_ymd_and_hms(2024, 2, 29, 12, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap(),
        ];

        for date in samples {
            let wire = serialize_date(&date).unwrap();
            assert_eq!(parse_date(&wire), Some(date), "往返失败: {}", wire);
        }
    }

    #[test]
    fn test_round_trip_over_sub_millisecond_offsets() {
        let base = Utc.with_ymd_and_hms(2020, 2, 3, 0, 0, 0).unwrap();
        // 覆盖整毫秒、毫秒内任意纳秒和跨秒的偏移
        let mut offset: i64 = 1;
        for _ in 0..500 {
            offset = (offset * 48_271 + 12_345) % 5_000_000_000;
            let date = base + Duration::nanoseconds(offset);

            match serialize_date(&date) {
                Some(wire) => assert_eq!(parse_date(&wire), Some(date), "往返失败: {}", wire),
                None => assert_ne!(date.nanosecond() % NANOS_PER_MILLI, 0),
            }

            let aligned = truncate_to_millis(date);
            let wire = serialize_date(&aligned).unwrap();
            assert_eq!(parse_date(&wire), Some(aligned), "往返失败: {}", wire);
        }
    }

    #[test]
    fn test_sub_millisecond_date_is_not_representable() {
        let base = Utc.with_ymd_and_hms(2020, 2, 3, 0, 0, 0).unwrap();
        let date = base + Duration::nanoseconds(1_500_000);
        assert_eq!(serialize_date(&date), None);
        assert_eq!(
            serialize_date(&truncate_to_millis(date)).as_deref(),
            Some("2020-02-03T00:00:00.001Z")
        );

        // 后端返回的高精度时间戳按毫秒截断
        assert_eq!(
            parse_date("2020-02-03T00:00:00.001500Z"),
            Some(base + Duration::milliseconds(1))
        );
        assert_eq!(
            parse_date("2020-02-03T00:00:00.999999999"),
            Some(base + Duration::milliseconds(999))
        );
    }

    #[test]
    fn test_out_of_range_date_is_omitted() {
        let far_future = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(serialize_date(&far_future), None);

        let aktien = Aktien {
            symbol: Some("Apple Inc. (aapl)".to_string()),
            date: Some(far_future),
            ..Default::default()
        };
        let json = serde_json::to_value(to_wire(&aktien)).unwrap();
        assert!(json.get("date").is_none());
        assert_eq!(json["symbol"], "Apple Inc. (aapl)");
    }

    #[test]
    fn test_parse_server_variants() {
        let midnight = Utc.with_ymd_and_hms(2020, 2, 3, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2020-02-03T00:00:00Z"), Some(midnight));
        assert_eq!(parse_date("2020-02-03T01:00:00+01:00"), Some(midnight));
        assert_eq!(parse_date("2020-02-03T00:00:00"), Some(midnight));
        assert_eq!(parse_date("2020-02-03"), Some(midnight));
    }

    #[test]
    fn test_unparseable_date_becomes_absent() {
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2020-13-45"), None);

        let dto = AktienDto {
            id: Some(7),
            date: Some("gestern".to_string()),
            ..Default::default()
        };
        let aktien = from_wire(dto);
        assert_eq!(aktien.id, Some(7));
        assert_eq!(aktien.date, None);
    }

    #[test]
    fn test_absent_date_stays_absent() {
        let aktien = from_wire(AktienDto::default());
        assert_eq!(aktien.date, None);
        assert_eq!(to_wire(&aktien).date, None);
    }
}
