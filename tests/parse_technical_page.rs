// End-to-end parse of a realistic technical-analysis page rendered to
// markdown, the way the scrape API returns it.
use ta_sniper::model::IndicatorValue;
use ta_sniper::parser::{InvestingParser, Parser};

const PAGE: &str = r#"# Ethereum Technical Analysis

ETH/USD
4,491.64
+11.46(+0.26%)

## Summary:Buy

| Technical Indicators: | Strong Buy | Buy: (9) | Sell: (0) |
| Moving Averages: | Buy | Buy: (8) | Sell: (4) |

## Technical Indicators

| Name | Value | Action |
| --- | --- | --- |
| RSI(14) | 55.271 | Buy |
| STOCH(9,6) | 43.715 | Sell |
| STOCHRSI(14) | 80.655 | Overbought |
| MACD(12,26) | 19.500 | Buy |
| ADX(14) | 28.706 | Buy |
| Williams %R | -18.659 | Overbought |
| CCI(14) | 77.127 | Buy |
| ATR(14) | 38.287 | Less Volatility |
| Ultimate Oscillator | 52.751 | Buy |
| ROC | 1.017 | Buy |
| Bull/Bear Power(13) | 27.103 | Buy |
| Highs/Lows(14) | 10.435 | Buy |

Technical Indicators Summary: Strong Buy Buy: (9) Sell: (0)

## Moving Averages

| Period | Simple | Exponential |
| MA5 | 4488.29 | Buy | 4488.00 | Buy |
| MA10 | 4483.43 | Buy | 4486.07 | Buy |
| MA20 | 4478.66 | Buy | 4483.66 | Buy |
| MA50 | 4479.88 | Buy | 4479.28 | Buy |
| MA100 | 4477.51 | Buy | 4475.53 | Buy |
| MA200 | 4467.18 | Buy | 4470.47 | Buy |

Moving Averages Summary: Buy Buy: (8) Sell: (4)

## [Pivot Points]

| Name | S3 | S2 | S1 | Pivot | R1 | R2 | R3 |
| Classic | 4419.47 | 4447.03 | 4464.18 | 4474.59 | 4491.74 | 4502.15 | 4529.71 |
| Fibonacci | 4447.03 | 4457.56 | 4464.06 | 4474.59 | 4485.12 | 4491.62 | 4502.15 |
| Camarilla | 4471.30 | 4473.83 | 4476.36 | 4474.59 | 4481.42 | 4483.95 | 4486.48 |
| Woodie's | 4423.68 | 4449.13 | 4468.39 | 4476.69 | 4495.95 | 4504.25 | 4533.81 |

## Footer
"#;

const URL: &str = "https://www.investing.com/crypto/ethereum/technical";

#[test]
fn full_page_extraction() {
    let data = InvestingParser::new().parse(PAGE, URL).unwrap();

    assert_eq!(data.symbol, "ETH");
    assert_eq!(data.price, 4491.64);
    assert_eq!(data.price_change, 11.46);
    assert_eq!(data.price_change_percent, 0.26);
    assert_eq!(data.source_url, URL);

    assert_eq!(data.summary.overall, "Buy");
    assert_eq!(data.summary.technical_indicators, "Buy");
    assert_eq!(data.summary.moving_averages, "Buy");

    assert_eq!(data.technical_indicators_summary.recommendation, "Strong Buy");
    assert_eq!(data.technical_indicators_summary.buy_count, 9);
    assert_eq!(data.technical_indicators_summary.sell_count, 0);
    assert_eq!(data.moving_averages_summary.recommendation, "Buy");
    assert_eq!(data.moving_averages_summary.buy_count, 8);
    assert_eq!(data.moving_averages_summary.sell_count, 4);
}

#[test]
fn full_page_indicator_table() {
    let data = InvestingParser::new().parse(PAGE, URL).unwrap();

    assert_eq!(data.technical_indicators.len(), 12);
    let rsi = &data.technical_indicators[0];
    assert_eq!(rsi.name, "RSI(14)");
    assert_eq!(rsi.value, IndicatorValue::Number(55.271));
    assert_eq!(rsi.action, "Buy");
    assert_eq!(rsi.raw_value, "| RSI(14) | 55.271 | Buy |");

    let williams = data
        .technical_indicators
        .iter()
        .find(|i| i.name == "Williams %R")
        .unwrap();
    assert_eq!(williams.value, IndicatorValue::Number(-18.659));
    assert_eq!(williams.action, "Overbought");

    let atr = data
        .technical_indicators
        .iter()
        .find(|i| i.name == "ATR(14)")
        .unwrap();
    assert_eq!(atr.action, "Less Volatility");
}

#[test]
fn full_page_moving_averages() {
    let data = InvestingParser::new().parse(PAGE, URL).unwrap();

    let periods: Vec<u32> = data.moving_averages.iter().map(|m| m.period).collect();
    assert_eq!(periods, vec![5, 10, 20, 50, 100, 200]);

    let ma50 = &data.moving_averages[3];
    assert_eq!(ma50.simple.value, 4479.88);
    assert_eq!(ma50.simple.action, "Buy");
    assert_eq!(ma50.exponential.value, 4479.28);
}

#[test]
fn full_page_pivot_points() {
    let data = InvestingParser::new().parse(PAGE, URL).unwrap();

    let names: Vec<&str> = data.pivot_points.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Classic", "Fibonacci", "Camarilla", "Woodie's"]);

    let classic = &data.pivot_points[0];
    assert_eq!(classic.s3, Some(4419.47));
    assert_eq!(classic.pivot, 4474.59);
    assert_eq!(classic.r3, Some(4529.71));

    let woodies = &data.pivot_points[3];
    assert_eq!(woodies.pivot, 4476.69);
    assert_eq!(woodies.r3, Some(4533.81));
}

#[test]
fn record_serializes_camel_case() {
    let data = InvestingParser::new().parse(PAGE, URL).unwrap();
    let json = serde_json::to_value(&data).unwrap();

    assert!(json.get("priceChange").is_some());
    assert!(json.get("priceChangePercent").is_some());
    assert!(json.get("scrapedAt").is_some());
    assert!(json.get("sourceUrl").is_some());
    // numeric indicator values serialize as plain numbers
    assert_eq!(json["technicalIndicators"][0]["value"], 55.271);
    assert_eq!(json["technicalIndicators"][0]["rawValue"], "| RSI(14) | 55.271 | Buy |");
}
