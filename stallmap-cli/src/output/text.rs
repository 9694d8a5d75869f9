//! Text report formatting with optional colors.

use stallmap_core::{StallMap, StallRecord, StallSummary};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

// Frame
const RULE: char = '═';
const RULE_WIDTH: usize = 60;

const MISSING: &str = "?";
const NOT_AVAILABLE: &str = "N/A";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats the framed stall report with its summary line.
    pub fn format_report(&self, stalls: &StallMap) -> String {
        let mut lines = vec![
            String::new(),
            self.rule(),
            format!("  {}", self.bold("STALL MAP DATA")),
            self.rule(),
        ];

        if stalls.is_empty() {
            lines.push(format!("  {}", self.dim("(no stalls returned)")));
        }
        lines.extend(stalls.records().iter().map(|r| self.format_record(r)));

        lines.push(self.rule());
        lines.push(self.format_summary(&stalls.summary()));
        lines.push(self.rule());

        lines.join("\n")
    }

    /// Formats one stall; reserved stalls get a second line with the vendor.
    pub fn format_record(&self, record: &StallRecord) -> String {
        // Pad before coloring so escapes don't count toward the width.
        let label = format!("{:9}", record.status_label());
        let label = if record.reserved {
            self.yellow(&label)
        } else {
            self.green(&label)
        };

        let mut out = format!(
            "  [{}]  {:10}  Floor: {:15}  Type: {}",
            label,
            or_missing(&record.stall_code),
            or_missing(&record.floor_name),
            or_missing(&record.stall_type),
        );

        if record.reserved {
            out.push_str(&format!(
                "\n              Vendor: {}  ({})  Payment: {}",
                self.cyan(or_na(record.vendor_name.as_deref())),
                or_na(record.business_name.as_deref()),
                or_na(record.payment_status.as_deref()),
            ));
        }

        out
    }

    /// Formats the totals line.
    pub fn format_summary(&self, summary: &StallSummary) -> String {
        format!(
            "  Total: {}  |  Reserved: {}  |  Available: {}",
            self.bold(&summary.total.to_string()),
            summary.reserved,
            summary.available
        )
    }

    fn rule(&self) -> String {
        self.dim(&RULE.to_string().repeat(RULE_WIDTH))
    }

    // ========================================================================
    // Color Helpers
    // ========================================================================

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

fn or_missing(value: &str) -> &str {
    if value.is_empty() {
        MISSING
    } else {
        value
    }
}

fn or_na(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(NOT_AVAILABLE)
}

// ============================================================================
// Tests
// ============================================================================
