use std::time::Duration;

use console::Style;
use tempo_core::frame::FrameRate;
use tempo_core::params::{PassParams, ResolvedParams};
use tempo_core::pipeline::{PipelineConfig, RetimeSummary};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

fn print_title(s: &Styles, title: &str) {
    println!();
    println!("  {}", s.title.apply_to(title));
    println!(
        "  {}",
        s.title.apply_to("\u{2550}".repeat(title.chars().count()))
    );
    println!();
}

/// A fallback threshold, or "off" when zero.
fn threshold_or_off(s: &Styles, value: impl Into<i32>) -> String {
    match value.into() {
        0 => s.disabled.apply_to("off").to_string(),
        v => s.value.apply_to(v).to_string(),
    }
}

pub fn print_run_summary(config: &PipelineConfig, target: FrameRate, engine_name: &str) {
    let s = Styles::new();
    let interp = &config.interpolation;

    print_title(&s, "Tempo Retime");

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(config.input.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Engine"),
        s.method.apply_to(engine_name)
    );
    println!();

    println!("  {}", s.header.apply_to("Timing"));
    println!(
        "    {:<12}{} fps ({:.3})",
        s.label.apply_to("Source"),
        s.value.apply_to(config.source_fps),
        config.source_fps.as_f64()
    );
    println!(
        "    {:<12}{} fps ({:.3})",
        s.label.apply_to("Target"),
        s.value.apply_to(target),
        target.as_f64()
    );
    println!();

    println!("  {}", s.header.apply_to("Interpolation"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Preset"),
        s.method.apply_to(interp.preset)
    );
    let block = interp
        .block_size
        .map(|b| s.value.apply_to(b.to_string()).to_string())
        .unwrap_or_else(|| s.disabled.apply_to("auto").to_string());
    println!("    {:<12}{}", s.label.apply_to("Block"), block);
    println!(
        "    {:<12}{} / {}",
        s.label.apply_to("Mask/skip"),
        s.value.apply_to(interp.mask_threshold),
        s.value.apply_to(interp.skip_threshold)
    );
    if interp.occlusion {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Occlusion"),
            s.value.apply_to(interp.occlusion_threshold)
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Occlusion"),
            s.disabled.apply_to("disabled")
        );
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Blend over"),
        threshold_or_off(&s, interp.blend_over)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Skip over"),
        threshold_or_off(&s, interp.skip_over)
    );
    if let Some(sigma) = interp.prefilter_sigma {
        println!(
            "    {:<12}sigma {}",
            s.label.apply_to("Prefilter"),
            s.value.apply_to(format!("{sigma:.2}"))
        );
    }
    println!(
        "    {:<12}{}{}",
        s.label.apply_to("View"),
        s.method.apply_to(interp.output),
        if interp.debug { " + debug bar" } else { "" }
    );
    println!();
}

fn print_pass(s: &Styles, name: &str, pass: &PassParams) {
    println!("  {}", s.header.apply_to(name));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Block"),
        s.value.apply_to(pass.block)
    );
    match pass.refine_block {
        Some(refine) => println!(
            "    {:<12}{}",
            s.label.apply_to("Refine"),
            s.value.apply_to(refine)
        ),
        None => println!(
            "    {:<12}{}",
            s.label.apply_to("Refine"),
            s.disabled.apply_to("off")
        ),
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Search"),
        s.method.apply_to(pass.search)
    );
    let t = &pass.thresholds;
    println!(
        "    {:<12}mask {} skip {} occlusion {}",
        s.label.apply_to("Thresholds"),
        s.value.apply_to(t.mask_threshold),
        s.value.apply_to(t.skip_threshold),
        s.value.apply_to(t.occlusion_threshold)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Gamma"),
        s.value.apply_to(format!("{:.2}", t.gamma))
    );
    println!();
}

pub fn print_resolved_params(params: &ResolvedParams, width: usize, height: usize) {
    let s = Styles::new();

    print_title(&s, "Resolved Parameters");
    println!(
        "  {:<14}{}",
        s.label.apply_to("Resolution"),
        s.value.apply_to(format!("{width}x{height}"))
    );
    println!(
        "  {:<14}{}{}",
        s.label.apply_to("View"),
        s.method.apply_to(params.output),
        if params.debug { " + debug bar" } else { "" }
    );
    println!(
        "  {:<14}blend {} / duplicate {}",
        s.label.apply_to("Fallbacks"),
        threshold_or_off(&s, params.policy.blend_over),
        threshold_or_off(&s, params.policy.skip_over)
    );
    println!();

    print_pass(&s, "Primary Pass", &params.primary);
    match &params.secondary {
        Some(secondary) => print_pass(&s, "Secondary Pass", secondary),
        None => {
            println!(
                "  {}  {}",
                s.header.apply_to("Secondary Pass"),
                s.disabled.apply_to("disabled")
            );
            println!();
        }
    }
}

pub fn print_retime_report(summary: &RetimeSummary, elapsed: Duration) {
    let s = Styles::new();

    print_title(&s, "Retime Report");
    println!(
        "  {:<14}{} -> {}",
        s.label.apply_to("Frames"),
        s.value.apply_to(summary.source_frames),
        s.value.apply_to(summary.output_frames)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Passthrough"),
        s.value.apply_to(summary.passthrough)
    );
    for (letter, count) in summary.state_counts() {
        println!(
            "  {:<14}{}",
            s.label.apply_to(format!("State {letter}")),
            s.value.apply_to(count)
        );
    }
    if let Some(mean) = summary.mean_skip() {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Mean skip"),
            s.value.apply_to(format!("{mean:.1}"))
        );
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Elapsed"),
        s.value.apply_to(format!("{:.1}s", elapsed.as_secs_f64()))
    );
}
