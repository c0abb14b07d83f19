use pkdconf_core::{OptionDescriptor, OptionKind, Schema, HELP_SPELLING};

const HELP_COLUMN: usize = 50;
const LINE_WIDTH: usize = 132;
const INDENT: &str = "  ";

/// Renders the grouped option listing shown for `--help`.
pub fn render_help(schema: &Schema, program: &str) -> String {
    let mut lines = vec![
        format!("usage: {program} [{HELP_SPELLING}] [options] [script]"),
        String::new(),
    ];
    if !schema.description().is_empty() {
        lines.push(schema.description().to_string());
        lines.push(String::new());
    }

    lines.push("positional arguments:".to_string());
    push_entry(
        &mut lines,
        "script",
        "parameter or analysis script; further unrecognized tokens go to the engine",
    );
    lines.push(String::new());

    lines.push("options:".to_string());
    push_entry(&mut lines, HELP_SPELLING, "show this help message and exit");

    for group in schema.groups() {
        lines.push(String::new());
        lines.push(format!("{}:", group.label));
        for id in &group.members {
            let descriptor = schema.descriptor(*id);
            push_entry(&mut lines, &option_label(descriptor), &option_help(descriptor));
        }
    }
    lines.join("\n")
}

fn option_label(descriptor: &OptionDescriptor) -> String {
    let spellings = descriptor
        .spellings()
        .into_iter()
        .map(|spelling| spelling.text)
        .collect::<Vec<_>>()
        .join(", ");
    match descriptor.kind {
        OptionKind::Toggle => spellings,
        OptionKind::Scalar(_) | OptionKind::Repeatable(_) => {
            format!("{spellings} {}", descriptor.destination.to_uppercase())
        }
    }
}

fn option_help(descriptor: &OptionDescriptor) -> String {
    let default = match descriptor.kind {
        OptionKind::Toggle => descriptor.initial_value(),
        _ => descriptor.default.clone(),
    };
    if descriptor.help.is_empty() {
        format!("(default: {default})")
    } else {
        format!("{} (default: {default})", descriptor.help)
    }
}

/// Pushes `label` with `help` aligned at the help column, wrapping the help
/// text. Labels too wide for the column put the help on the following line.
fn push_entry(lines: &mut Vec<String>, label: &str, help: &str) {
    let first = format!("{INDENT}{label}");
    let help_lines = wrap_words(help, LINE_WIDTH - HELP_COLUMN);
    let mut help_lines = help_lines.into_iter();
    if first.len() + 2 <= HELP_COLUMN {
        match help_lines.next() {
            Some(line) => lines.push(format!("{first:<HELP_COLUMN$}{line}")),
            None => lines.push(first),
        }
    } else {
        lines.push(first);
    }
    for line in help_lines {
        lines.push(format!("{:HELP_COLUMN$}{line}", ""));
    }
}

fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use pkdconf_core::{OptionDescriptor, ParamValue, Schema, SchemaBuilder, ValueType};

    use super::{render_help, wrap_words, HELP_COLUMN};

    fn sample_schema() -> Schema {
        let mut builder = SchemaBuilder::new("Sample n-body code");
        builder
            .register_group(
                "Periodic Boundaries",
                [
                    OptionDescriptor::toggle("p", "bPeriodic", Some(false), "periodic/non-periodic"),
                    OptionDescriptor::toggle("ewald", "bEwald", Some(true), "enable/disable Ewald"),
                ],
            )
            .expect("register periodic group");
        builder
            .register_group(
                "I/O Parameters",
                [
                    OptionDescriptor::scalar(
                        "mpc",
                        "dBoxSize",
                        ValueType::Float,
                        ParamValue::Float(1.0),
                        "size of box",
                    ),
                    OptionDescriptor::repeatable("orbit", "lstOrbits", ValueType::Int, ""),
                ],
            )
            .expect("register io group");
        builder.build()
    }

    #[test]
    fn functional_help_lists_groups_in_registration_order() {
        let help = render_help(&sample_schema(), "pkdgrav3");

        assert!(help.starts_with("usage: pkdgrav3 [--help] [options] [script]"));
        assert!(help.contains("Sample n-body code"));
        let periodic = help.find("Periodic Boundaries:").expect("periodic header");
        let io = help.find("I/O Parameters:").expect("io header");
        assert!(periodic < io);
    }

    #[test]
    fn unit_help_entries_show_spelling_order_metavar_and_default() {
        let help = render_help(&sample_schema(), "pkdgrav3");
        let line_for = |needle: &str| {
            help.lines()
                .find(|line| line.trim_start().starts_with(needle))
                .unwrap_or_else(|| panic!("missing help line for {needle}"))
                .to_string()
        };

        let periodic = line_for("+p, -p");
        assert!(periodic.ends_with("periodic/non-periodic (default: False)"));
        assert_eq!(periodic.find("periodic/"), Some(HELP_COLUMN));

        assert!(line_for("-ewald, +ewald").contains("(default: True)"));
        assert!(line_for("-mpc DBOXSIZE").contains("size of box (default: 1.0)"));
        assert!(line_for("-orbit LSTORBITS").contains("(default: None)"));
    }

    #[test]
    fn unit_wrap_words_breaks_on_whitespace_within_width() {
        assert_eq!(
            wrap_words("alpha beta gamma delta", 11),
            vec!["alpha beta", "gamma delta"]
        );
        assert!(wrap_words("", 10).is_empty());
    }
}
