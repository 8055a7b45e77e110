use crate::commands::session::{ResultsPanel, Screen, ScreenStatus};
use crate::models::view_types::{ProbabilityBar, RiskTier, SeriesPoint};
use crate::services::views::derive::{format_percent, TabContent};

const BAR_WIDTH: usize = 30;

pub fn render_screen_text(screen: &Screen) -> String {
    let mut out = String::new();

    out.push_str("Brain MRI Analysis\n");
    out.push_str("==================\n\n");

    match &screen.upload {
        Some(upload) => out.push_str(&format!(
            "Upload: {} ({:.1} KB, {})\n\n",
            upload.name, upload.size_kb, upload.mime_type
        )),
        None => out.push_str("Upload: no file selected\n\n"),
    }

    match &screen.status {
        ScreenStatus::Idle => out.push_str("Status: waiting for an analysis request\n"),
        ScreenStatus::Loading {
            title,
            subtitle,
            steps,
        } => {
            out.push_str(&format!("{}\n{}\n", title, subtitle));
            for step in steps {
                out.push_str(&format!("  - {}\n", step));
            }
        }
        ScreenStatus::Error { message } => {
            out.push_str("Analysis Failed\n");
            out.push_str(&format!("{}\n", message));
        }
        ScreenStatus::Ready => {}
    }

    if let Some(results) = &screen.results {
        render_results(&mut out, results);
    }

    out
}

fn risk_marker(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::High => "[!!]",
        RiskTier::Moderate => "[!]",
        RiskTier::Low => "[ok]",
    }
}

fn bar(value: f64) -> String {
    let filled = (value.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn render_chart(out: &mut String, bars: &[ProbabilityBar]) {
    for b in bars {
        out.push_str(&format!(
            "{} {:<12} {} {:>6}%\n",
            if b.is_predicted { "*" } else { " " },
            b.name,
            bar(b.value),
            b.percentage
        ));
    }
}

fn render_series(out: &mut String, points: &[SeriesPoint]) {
    for p in points {
        out.push_str(&format!(
            "  {:<12} {} {:>6}%\n",
            p.name.replace('_', " "),
            bar(p.value),
            format_percent(p.value)
        ));
    }
}

fn render_results(out: &mut String, results: &ResultsPanel) {
    let s = &results.summary;
    out.push_str(&format!("Prediction:      {}\n", s.prediction));
    out.push_str(&format!("Confidence:      {}%\n", format_percent(s.confidence)));
    out.push_str(&format!(
        "Model Accuracy:  {}%\n",
        format_percent(s.model_accuracy)
    ));
    out.push_str(&format!(
        "Risk Level:      {} {}\n",
        s.risk_level,
        risk_marker(s.risk_tier)
    ));
    if let Some(description) = &s.risk_description {
        out.push_str(&format!("                 {}\n", description));
    }

    out.push_str("\nClass Probabilities\n");
    render_chart(out, &results.probability_chart);

    out.push('\n');
    let strip: Vec<String> = results
        .tabs
        .iter()
        .map(|t| {
            if t.active {
                format!("[{}]", t.title)
            } else {
                t.title.clone()
            }
        })
        .collect();
    out.push_str(&format!("{}\n\n", strip.join(" | ")));

    match &results.content {
        TabContent::ActivationMaps(view) => {
            out.push_str(&format!("{}\n{}\n", view.title, view.intro));
            if view.tiles.is_empty() {
                out.push_str("No activation maps were returned for this analysis.\n");
            }
            for tile in &view.tiles {
                let dims = tile
                    .dimensions
                    .map(|[w, h]| format!("{}x{}", w, h))
                    .unwrap_or_else(|| "undecodable".to_string());
                out.push_str(&format!(
                    "{} {:<12} {:>6}%  map {} ({} bytes)\n",
                    if tile.is_predicted { "*" } else { " " },
                    tile.name,
                    format_percent(tile.probability),
                    dims,
                    tile.image.len()
                ));
            }
        }
        TabContent::Quantum(view) => {
            out.push_str("Quantum Circuit Analysis\n");
            for spec in &view.specs {
                out.push_str(&format!("  {}: {}\n", spec.label, spec.value));
            }
            out.push_str("\nCircuit Architecture\n");
            for line in &view.circuit {
                out.push_str(&format!("  {}\n", line));
            }
            out.push('\n');
            for gate in &view.gates {
                out.push_str(&format!("  {} - {}\n", gate.name, gate.description));
            }
        }
        TabContent::Features(view) => {
            out.push_str("Feature Extraction Pipeline\n");
            out.push_str(&format!("{}\n\n", view.intro));
            for (i, step) in view.steps.iter().enumerate() {
                out.push_str(&format!(
                    "  Step {}: {} - {}\n",
                    i + 1,
                    step.name,
                    step.description
                ));
            }
        }
        TabContent::Confidence(view) => {
            out.push_str("Confidence Analysis\n");
            out.push_str(&format!(
                "Top Prediction:    {} ({}%)\n",
                view.top.name,
                format_percent(view.top.value)
            ));
            if let Some(runner_up) = &view.runner_up {
                out.push_str(&format!(
                    "Runner-up:         {} ({}%)\n",
                    runner_up.name,
                    format_percent(runner_up.value)
                ));
            }
            out.push_str(&format!(
                "Confidence Margin: {}% ({})\n",
                format_percent(view.margin.value),
                view.margin.strength.describe()
            ));
            out.push_str(&format!(
                "Reliability:       {} (based on {}% confidence)\n\n",
                view.reliability.describe(),
                format_percent(view.confidence)
            ));
            out.push_str("Probability Distribution\n");
            render_series(out, &view.distribution);
        }
        TabContent::Clinical(report) => {
            out.push_str(&format!("{}\n", report.title));
            out.push_str(&format!(
                "{} · {}\nReport ID: {}\n\n",
                report.subtitle, report.generated_at, report.report_id
            ));
            let f = &report.findings;
            out.push_str("Findings\n");
            out.push_str(&format!(
                "  Predicted Classification: {}\n",
                f.predicted_classification
            ));
            out.push_str(&format!(
                "  Confidence Level:         {}%\n",
                format_percent(f.confidence)
            ));
            out.push_str(&format!(
                "  Risk Assessment:          {} {}\n",
                f.risk_level,
                risk_marker(f.risk_tier)
            ));
            out.push_str(&format!(
                "  Model Accuracy:           {}%\n\n",
                format_percent(f.model_accuracy)
            ));
            out.push_str(&format!("Clinical Description\n{}\n\n", report.description));
            out.push_str(&format!("Recommendation\n{}\n\n", report.recommendation));
            out.push_str(&format!("Important Disclaimer\n{}\n", report.disclaimer));
        }
    }
}
