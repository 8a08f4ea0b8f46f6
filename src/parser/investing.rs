// Investing.com-style technical page parsing (markdown as rendered by the
// scrape API). Every extractor is a pure function of the text; a miss produces
// the field default, never an error.
use crate::model::{
    IndicatorValue, MaReading, MovingAverage, ParserError, PivotPoint, SummaryLabels,
    TechnicalAnalysisData, TechnicalAnalysisSummary, TechnicalIndicator,
};
use crate::parser::scan::{self, Cursor};
use chrono::Utc;

pub trait Parser {
    fn parse(&self, markdown: &str, source_url: &str)
    -> Result<TechnicalAnalysisData, ParserError>;
}

pub struct InvestingParser;

impl InvestingParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InvestingParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for InvestingParser {
    /// Runs every sub-extractor once against the same text and assembles the
    /// record. `Err` is reserved for an internal fault of the parse as a
    /// whole; sparse matches still come back as `Ok` with defaulted fields.
    fn parse(
        &self,
        markdown: &str,
        source_url: &str,
    ) -> Result<TechnicalAnalysisData, ParserError> {
        Ok(TechnicalAnalysisData {
            symbol: extract_symbol(markdown),
            price: extract_price(markdown),
            price_change: extract_price_change(markdown),
            price_change_percent: extract_price_change_percent(markdown),
            summary: extract_summary(markdown),
            technical_indicators_summary: extract_count_summary(markdown, "Technical Indicators:"),
            moving_averages_summary: extract_count_summary(markdown, "Moving Averages:"),
            technical_indicators: extract_indicators(markdown),
            moving_averages: extract_moving_averages(markdown),
            pivot_points: extract_pivot_points(markdown),
            scraped_at: Utc::now(),
            source_url: source_url.to_string(),
        })
    }
}

const USD_TICKERS: [&str; 5] = ["ETH", "BTC", "ADA", "SOL", "DOT"];

fn extract_symbol(markdown: &str) -> String {
    if let Some(at) = markdown.find("# ") {
        let title = markdown[at + 2..].lines().next().unwrap_or("").to_lowercase();
        if title.contains("ethereum") || title.contains("eth") {
            return "ETH".to_string();
        }
        if title.contains("bitcoin") || title.contains("btc") {
            return "BTC".to_string();
        }
    }

    // Fall back to the first <TICKER>/USD occurrence.
    let bytes = markdown.as_bytes();
    let mut from = 0;
    while let Some(at) = scan::find_ci(markdown, "/usd", from) {
        if at >= 3 {
            let prefix = &bytes[at - 3..at];
            if let Some(ticker) = USD_TICKERS
                .iter()
                .find(|t| prefix.eq_ignore_ascii_case(t.as_bytes()))
            {
                return ticker.to_string();
            }
        }
        from = at + 1;
    }

    "UNKNOWN".to_string()
}

/// Price, signed change and signed percent as they appear in the quote block:
/// the price on one line, `+11.46(+0.26%)` on the next.
struct QuoteBlock {
    price: f64,
    change: f64,
    percent: f64,
}

fn digit_starts(text: &str) -> impl Iterator<Item = usize> + '_ {
    text.bytes()
        .enumerate()
        .filter(|(_, b)| b.is_ascii_digit())
        .map(|(at, _)| at)
}

fn quote_block(markdown: &str) -> Option<QuoteBlock> {
    digit_starts(markdown).find_map(|at| quote_block_at(markdown, at))
}

fn quote_block_at(markdown: &str, at: usize) -> Option<QuoteBlock> {
    let mut c = Cursor::new(markdown, at);
    let price = c.comma_number(true)?;
    if !c.skip_ws_over_newline() {
        return None;
    }
    let change_sign = c.sign()?;
    let change = c.comma_number(true)?;
    c.skip_ws();
    if !c.eat(b'(') {
        return None;
    }
    let percent_sign = c.sign()?;
    let percent = c.comma_number(true)?;
    if !c.eat(b'%') || !c.eat(b')') {
        return None;
    }
    Some(QuoteBlock {
        price,
        change: change_sign * change,
        percent: percent_sign * percent,
    })
}

fn price_from_quote(markdown: &str) -> Option<f64> {
    quote_block(markdown).map(|q| q.price)
}

/// `4,484.17 USD`
fn price_with_usd(markdown: &str) -> Option<f64> {
    digit_starts(markdown).find_map(|at| {
        let mut c = Cursor::new(markdown, at);
        let value = c.comma_number(false)?;
        c.skip_ws();
        c.eat_ci("usd").then_some(value)
    })
}

/// `Price: $4,484.17`
fn labeled_price(markdown: &str) -> Option<f64> {
    let mut from = 0;
    while let Some(at) = scan::find_ci(markdown, "price", from) {
        let mut c = Cursor::new(markdown, at + "price".len());
        c.skip_while(|b| b == b':' || b.is_ascii_whitespace());
        c.eat(b'$');
        if let Some(value) = c.comma_number(false) {
            return Some(value);
        }
        from = at + 1;
    }
    None
}

/// Last-resort heuristic: any `4,xxx.xx` shaped number. Only correct for
/// instruments trading in that band; kept for backward compatibility.
fn band_price(markdown: &str) -> Option<f64> {
    let bytes = markdown.as_bytes();
    for at in 0..bytes.len().saturating_sub(7) {
        if bytes[at] == b'4'
            && bytes[at + 1] == b','
            && bytes[at + 2..at + 5].iter().all(|b| b.is_ascii_digit())
            && bytes[at + 5] == b'.'
            && bytes[at + 6..at + 8].iter().all(|b| b.is_ascii_digit())
        {
            let token = format!("4{}.{}", &markdown[at + 2..at + 5], &markdown[at + 6..at + 8]);
            return token.parse().ok();
        }
    }
    None
}

// Most specific first. A looser pattern would spuriously match inputs meant
// for a stricter one, so the order is load-bearing.
const PRICE_CHAIN: [fn(&str) -> Option<f64>; 4] =
    [price_from_quote, price_with_usd, labeled_price, band_price];

fn extract_price(markdown: &str) -> f64 {
    PRICE_CHAIN
        .iter()
        .find_map(|matcher| matcher(markdown))
        .unwrap_or(0.0)
}

/// Standalone `+11.46(+0.26%)` fragment, no price line required.
fn signed_change(markdown: &str) -> Option<(f64, f64)> {
    markdown
        .bytes()
        .enumerate()
        .filter(|(_, b)| *b == b'+' || *b == b'-')
        .find_map(|(at, _)| signed_change_at(markdown, at))
}

fn signed_change_at(markdown: &str, at: usize) -> Option<(f64, f64)> {
    let mut c = Cursor::new(markdown, at);
    let sign = c.sign()?;
    let amount = c.comma_number(false)?;
    c.skip_ws();
    if !c.eat(b'(') {
        return None;
    }
    let percent_sign = c.sign()?;
    let percent = c.comma_number(false)?;
    if !c.eat(b'%') || !c.eat(b')') {
        return None;
    }
    Some((sign * amount, percent_sign * percent))
}

fn extract_price_change(markdown: &str) -> f64 {
    quote_block(markdown)
        .map(|q| q.change)
        .or_else(|| signed_change(markdown).map(|(change, _)| change))
        .unwrap_or(0.0)
}

fn extract_price_change_percent(markdown: &str) -> f64 {
    quote_block(markdown)
        .map(|q| q.percent)
        .or_else(|| signed_change(markdown).map(|(_, percent)| percent))
        .unwrap_or(0.0)
}

fn extract_summary(markdown: &str) -> SummaryLabels {
    let mut summary = SummaryLabels::default();
    if let Some(word) = heading_summary(markdown) {
        summary.overall = word;
    }
    if let Some(word) = section_recommendation(markdown, "Technical Indicators") {
        summary.technical_indicators = word;
    }
    if let Some(word) = section_recommendation(markdown, "Moving Averages") {
        summary.moving_averages = word;
    }
    summary
}

/// `## Summary:<word>` — the word sits right after the colon.
fn heading_summary(markdown: &str) -> Option<String> {
    let mut from = 0;
    while let Some(at) = scan::find_ci(markdown, "## summary:", from) {
        let mut c = Cursor::new(markdown, at + "## summary:".len());
        if let Some(word) = c.word() {
            return Some(word.to_string());
        }
        from = at + 1;
    }
    None
}

/// First `<word> Buy: (n) Sell: (m)` fragment after the section label.
fn section_recommendation(markdown: &str, section: &str) -> Option<String> {
    let floor = scan::find_ci(markdown, section, 0)? + section.len();
    let mut from = floor;
    while let Some(at) = scan::find_ci(markdown, "buy:", from) {
        if let Some(word) = counted_label_at(markdown, at, floor) {
            return Some(word);
        }
        from = at + 1;
    }
    None
}

fn counted_label_at(markdown: &str, buy_at: usize, floor: usize) -> Option<String> {
    let bytes = markdown.as_bytes();

    // the recommendation word, separated from "Buy:" by whitespace
    let mut at = buy_at;
    while at > floor && bytes[at - 1].is_ascii_whitespace() {
        at -= 1;
    }
    if at == buy_at {
        return None;
    }
    let word_end = at;
    while at > floor && scan::is_word_byte(bytes[at - 1]) {
        at -= 1;
    }
    if at == word_end {
        return None;
    }
    let word = markdown[at..word_end].to_string();

    let mut c = Cursor::new(markdown, buy_at + "buy:".len());
    c.skip_ws();
    if !c.eat(b'(') {
        return None;
    }
    c.uint()?;
    if !c.eat(b')') || !c.skip_ws_required() || !c.eat_ci("sell:") {
        return None;
    }
    c.skip_ws();
    if !c.eat(b'(') {
        return None;
    }
    c.uint()?;
    if !c.eat(b')') {
        return None;
    }
    Some(word)
}

struct IndicatorPattern {
    name: &'static str,
    /// Oscillators that can read negative take a leading minus in the value cell.
    signed: bool,
    /// ATR actions span several words ("Less Volatility").
    multiword_action: bool,
}

// Fixed catalog, in table order. First match wins per line.
const INDICATOR_CATALOG: &[IndicatorPattern] = &[
    IndicatorPattern { name: "RSI(14)", signed: false, multiword_action: false },
    IndicatorPattern { name: "STOCH(9,6)", signed: false, multiword_action: false },
    IndicatorPattern { name: "STOCHRSI(14)", signed: false, multiword_action: false },
    IndicatorPattern { name: "MACD(12,26)", signed: true, multiword_action: false },
    IndicatorPattern { name: "ADX(14)", signed: false, multiword_action: false },
    IndicatorPattern { name: "Williams %R", signed: true, multiword_action: false },
    IndicatorPattern { name: "CCI(14)", signed: true, multiword_action: false },
    IndicatorPattern { name: "ATR(14)", signed: false, multiword_action: true },
    IndicatorPattern { name: "Ultimate Oscillator", signed: false, multiword_action: false },
    IndicatorPattern { name: "ROC", signed: true, multiword_action: false },
    IndicatorPattern { name: "Bull/Bear Power(13)", signed: true, multiword_action: false },
    IndicatorPattern { name: "Highs/Lows(14)", signed: true, multiword_action: false },
];

fn extract_indicators(markdown: &str) -> Vec<TechnicalIndicator> {
    let mut out: Vec<TechnicalIndicator> = Vec::new();
    for line in markdown.lines() {
        if !line.contains('|') {
            continue;
        }
        for pattern in INDICATOR_CATALOG {
            if let Some((value, action)) = match_indicator_row(line, pattern) {
                if !out.iter().any(|i| i.name == pattern.name) {
                    out.push(TechnicalIndicator {
                        name: pattern.name.to_string(),
                        value,
                        action,
                        raw_value: line.trim().to_string(),
                    });
                }
                // the line is spent even if it could loosely fit another entry
                break;
            }
        }
    }
    out
}

/// `| <name> | <value> | <action>` with the name cell matched exactly.
fn match_indicator_row(line: &str, pattern: &IndicatorPattern) -> Option<(IndicatorValue, String)> {
    let cells: Vec<&str> = line.split('|').map(str::trim).collect();
    // cells[0] sits before the leading delimiter and cannot hold the name
    for at in 1..cells.len() {
        if !cells[at].eq_ignore_ascii_case(pattern.name) {
            continue;
        }
        let Some(value_cell) = cells.get(at + 1) else {
            break;
        };
        let Some(action_cell) = cells.get(at + 2) else {
            break;
        };
        let Some(token) = numeric_token(value_cell, pattern.signed) else {
            continue;
        };
        let action = if pattern.multiword_action {
            word_phrase(action_cell)
        } else {
            leading_word(action_cell)
        };
        let Some(action) = action else { continue };
        let value = match token.parse::<f64>() {
            Ok(number) => IndicatorValue::Number(number),
            // unparseable readings keep the raw fragment
            Err(_) => IndicatorValue::Text(token.to_string()),
        };
        return Some((value, action.to_string()));
    }
    None
}

/// The whole cell must be digits and dots (plus a minus for signed readings).
fn numeric_token(cell: &str, signed: bool) -> Option<&str> {
    let in_class = |b: u8| b.is_ascii_digit() || b == b'.' || (signed && b == b'-');
    (!cell.is_empty() && cell.bytes().all(in_class)).then_some(cell)
}

fn leading_word(cell: &str) -> Option<&str> {
    let end = cell
        .bytes()
        .position(|b| !scan::is_word_byte(b))
        .unwrap_or(cell.len());
    (end > 0).then(|| &cell[..end])
}

fn word_phrase(cell: &str) -> Option<&str> {
    let end = cell
        .bytes()
        .position(|b| !(scan::is_word_byte(b) || b == b' '))
        .unwrap_or(cell.len());
    (end > 0).then(|| cell[..end].trim_end())
}

const MA_PERIODS: [u32; 6] = [5, 10, 20, 50, 100, 200];

fn extract_moving_averages(markdown: &str) -> Vec<MovingAverage> {
    let mut out: Vec<MovingAverage> = Vec::new();
    for line in markdown.lines() {
        // coarse prefilter; separator rows carry no data
        if !line.contains('|') || !line.contains("MA") || line.contains("---") {
            continue;
        }
        for period in MA_PERIODS {
            if let Some(ma) = match_ma_row(line, period) {
                if !out.iter().any(|m| m.period == period) {
                    out.push(ma);
                }
                break;
            }
        }
    }
    out
}

/// `| MA50 | 4488.29 | Buy | 4488.00 | Buy |` — simple value/action, then
/// exponential value/action, closing delimiter required.
fn match_ma_row(line: &str, period: u32) -> Option<MovingAverage> {
    let label = format!("MA{period}");
    let cells: Vec<&str> = line.split('|').map(str::trim).collect();
    for at in 1..cells.len() {
        if !cells[at].eq_ignore_ascii_case(&label) {
            continue;
        }
        // four data cells plus the delimiter after the last one
        if at + 5 >= cells.len() {
            continue;
        }
        let (Some(simple_value), Some(simple_action), Some(exp_value), Some(exp_action)) = (
            whole_number(cells[at + 1]),
            whole_word(cells[at + 2]),
            whole_number(cells[at + 3]),
            whole_word(cells[at + 4]),
        ) else {
            continue;
        };
        return Some(MovingAverage {
            period,
            simple: MaReading {
                value: simple_value,
                action: simple_action.to_string(),
            },
            exponential: MaReading {
                value: exp_value,
                action: exp_action.to_string(),
            },
        });
    }
    None
}

fn whole_number(cell: &str) -> Option<f64> {
    if cell.is_empty() || !cell.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }
    cell.parse().ok()
}

fn whole_word(cell: &str) -> Option<&str> {
    (!cell.is_empty() && cell.bytes().all(scan::is_word_byte)).then_some(cell)
}

const PIVOT_METHODS: [&str; 4] = ["Classic", "Fibonacci", "Camarilla", "Woodie's"];

fn extract_pivot_points(markdown: &str) -> Vec<PivotPoint> {
    let Some(section) = pivot_section(markdown) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for name in PIVOT_METHODS {
        if let Some(pivot) = match_pivot_ladder(section, name) {
            out.push(pivot);
        }
    }
    out
}

/// Everything between the `## [Pivot Points]` heading line and the next
/// heading (or end of text).
fn pivot_section(markdown: &str) -> Option<&str> {
    let heading = scan::find_ci(markdown, "## [pivot points]", 0)?;
    let body = heading + markdown[heading..].find('\n')? + 1;
    let end = markdown[body..].find("##").map_or(markdown.len(), |i| body + i);
    Some(&markdown[body..end])
}

fn match_pivot_ladder(section: &str, name: &str) -> Option<PivotPoint> {
    let mut from = 0;
    while let Some(at) = scan::find_ci(section, name, from) {
        if let Some(pivot) = pivot_ladder_at(section, at + name.len(), name) {
            return Some(pivot);
        }
        from = at + 1;
    }
    None
}

/// Seven delimiter-separated levels after the method name. Not line-scoped:
/// the ladder may wrap across physical lines.
fn pivot_ladder_at(section: &str, pos: usize, name: &str) -> Option<PivotPoint> {
    let mut c = Cursor::new(section, pos);
    let mut levels = [0.0f64; 7];
    for level in &mut levels {
        c.skip_ws();
        if !c.eat(b'|') {
            return None;
        }
        c.skip_ws();
        *level = c.plain_number()?;
    }
    Some(PivotPoint {
        name: name.to_string(),
        s3: Some(levels[0]),
        s2: Some(levels[1]),
        s1: Some(levels[2]),
        pivot: levels[3],
        r1: Some(levels[4]),
        r2: Some(levels[5]),
        r3: Some(levels[6]),
    })
}

/// `| <label> | <recommendation> | Buy: (n) | Sell: (m) |` summary rows.
fn extract_count_summary(markdown: &str, label: &str) -> TechnicalAnalysisSummary {
    for line in markdown.lines() {
        if !line.contains('|') {
            continue;
        }
        let cells: Vec<&str> = line.split('|').collect();
        for at in 1..cells.len() {
            if !cells[at].trim().eq_ignore_ascii_case(label) {
                continue;
            }
            if at + 4 >= cells.len() || cells[at + 1].is_empty() {
                continue;
            }
            let Some(buy_count) = count_cell(cells[at + 2], "buy:") else {
                continue;
            };
            let Some(sell_count) = count_cell(cells[at + 3], "sell:") else {
                continue;
            };
            return TechnicalAnalysisSummary {
                recommendation: cells[at + 1].trim().to_string(),
                buy_count,
                sell_count,
                // not derived from the constituent rows in this version
                neutral_count: 0,
            };
        }
    }
    TechnicalAnalysisSummary::default()
}

/// A cell shaped `Buy: (9)`.
fn count_cell(cell: &str, label: &str) -> Option<u32> {
    let cell = cell.trim();
    if cell.len() < label.len()
        || !cell.as_bytes()[..label.len()].eq_ignore_ascii_case(label.as_bytes())
    {
        return None;
    }
    let rest = cell[label.len()..].trim_start();
    let digits = rest.strip_prefix('(')?.strip_suffix(')')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
