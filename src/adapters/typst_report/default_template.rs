//! Built-in Typst templates.
//!
//! A custom template passed via `[report] template_path` may use any subset
//! of the placeholders listed here; unknown text is left untouched.

const SCREEN_TEMPLATE: &str = r#"#set page(paper: "a4", margin: 1.5cm)
#set text(size: 10pt)

= Chop Zone Screen

{{SCREEN_SUMMARY}}

== Selection

{{SELECTION_TABLE}}

== Ranking

{{RANKING_TABLE}}

== Correlation of Selected Instruments

{{CORRELATION_TABLE}}

== Full Correlation Matrix

{{FULL_CORRELATION_TABLE}}

== Chop Zone History

{{ZONE_STRIPS}}

== Skipped Instruments

{{SKIPPED_TABLE}}
"#;

const ANALYSIS_TEMPLATE: &str = r#"#set page(paper: "a4", margin: 1.5cm)
#set text(size: 10pt)

= {{TICKER}} Analysis

{{ANALYSIS_SUMMARY}}

== Price

{{PRICE_CHART_SVG}}

{{LEGEND}}

== Chop Zone

{{CHOP_ZONE_SVG}}

== Forecast

{{FORECAST_TABLE}}

== Recent Bars

{{RECENT_BARS_TABLE}}
"#;

pub fn screen_template() -> &'static str {
    SCREEN_TEMPLATE
}

pub fn analysis_template() -> &'static str {
    ANALYSIS_TEMPLATE
}
