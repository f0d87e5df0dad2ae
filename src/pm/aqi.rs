// src/pm/aqi.rs

/// (concentration high bound, AQI low, AQI high) per EPA PM2.5 category,
/// each category starting where the previous one ends.
const PM25_BREAKPOINTS: [(f32, f32, f32); 7] = [
    (12.0, 0.0, 50.0),
    (35.4, 50.0, 100.0),
    (55.4, 100.0, 150.0),
    (150.4, 150.0, 200.0),
    (250.4, 200.0, 300.0),
    (350.4, 300.0, 400.0),
    (500.4, 400.0, 500.0),
];

/// US EPA air quality index for a PM2.5 concentration in ug/m^3.
///
/// Linear interpolation inside the matching category, truncated. Anything
/// above the last breakpoint saturates at 500.
pub fn pm25_to_us_aqi(pm2_5: u16) -> u16 {
    let c = f32::from(pm2_5);
    let mut c_low = 0.0;
    for (c_high, aqi_low, aqi_high) in PM25_BREAKPOINTS {
        if c <= c_high {
            let aqi = (aqi_high - aqi_low) * (c - c_low) / (c_high - c_low) + aqi_low;
            return aqi as u16;
        }
        c_low = c_high;
    }
    500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_bounds() {
        assert_eq!(pm25_to_us_aqi(0), 0);
        assert_eq!(pm25_to_us_aqi(12), 50);
        assert_eq!(pm25_to_us_aqi(500), 499);
        assert_eq!(pm25_to_us_aqi(501), 500);
        assert_eq!(pm25_to_us_aqi(u16::MAX), 500);
    }

    #[test]
    fn test_interpolation() {
        // 50 * 23 / 23.4 + 50
        assert_eq!(pm25_to_us_aqi(35), 99);
        // 50 * 14.6 / 20 + 100
        assert_eq!(pm25_to_us_aqi(50), 136);
        // 50 * 44.6 / 95 + 150
        assert_eq!(pm25_to_us_aqi(100), 173);
        assert_eq!(pm25_to_us_aqi(6), 25);
    }

    #[test]
    fn test_monotonic() {
        let mut last = 0;
        for pm in 0..=600 {
            let aqi = pm25_to_us_aqi(pm);
            assert!(aqi >= last, "AQI dropped at {} ug/m3", pm);
            last = aqi;
        }
    }
}
