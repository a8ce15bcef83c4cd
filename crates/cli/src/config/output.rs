use downline_model::{CommissionRates, DownlineReport};
use prettytable::{
    format::{FormatBuilder, LinePosition, LineSeparator, TableFormat},
    row, Table,
};
use time::format_description::well_known::Rfc3339;

/// Output format.
#[derive(clap::ValueEnum, Debug, Default, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Table.
    #[default]
    Table,
    /// JSON.
    Json,
}

impl OutputFormat {
    /// Display a downline report.
    pub fn display_report(&self, report: &DownlineReport, with_members: bool) -> eyre::Result<String> {
        match self {
            Self::Json => Ok(serde_json::to_string_pretty(report)?),
            Self::Table => Self::display_report_table(report, with_members),
        }
    }

    /// Display a commission rate table.
    pub fn display_rates(&self, rates: &CommissionRates) -> eyre::Result<String> {
        match self {
            Self::Json => Ok(serde_json::to_string_pretty(rates)?),
            Self::Table => {
                let mut table = Table::new();
                table.set_format(table_format());
                table.set_titles(row!["Level", "Rate"]);
                for (level, rate) in rates.iter() {
                    table.add_row(row![level, rate.normalize()]);
                }
                Ok(table.to_string())
            }
        }
    }

    fn display_report_table(report: &DownlineReport, with_members: bool) -> eyre::Result<String> {
        let mut levels = Table::new();
        levels.set_format(table_format());
        levels.set_titles(row!["Level", "Members", "Volume", "Rate", "Commission"]);
        for level in &report.levels {
            let stats = &level.stats;
            levels.add_row(row![
                level.level,
                stats.count,
                stats.volume.normalize(),
                stats.rate.normalize(),
                stats.commission.normalize()
            ]);
        }

        let mut totals = Table::new();
        totals.set_format(table_format());
        totals.set_titles(row!["Key", "Value"]);
        totals.add_row(row!["network size", report.totals.total_network_size]);
        totals.add_row(row![
            "business volume",
            report.totals.overall_business_volume.normalize()
        ]);
        totals.add_row(row![
            "commission",
            report.totals.total_commission.normalize()
        ]);

        let mut output = format!("{levels}\n{totals}");

        if with_members {
            let mut members = Table::new();
            members.set_format(table_format());
            members.set_titles(row![
                "Level",
                "Id",
                "Name",
                "Email",
                "Joined",
                "Team",
                "Investment",
                "Status"
            ]);
            for level in &report.levels {
                for member in &level.members {
                    members.add_row(row![
                        level.level,
                        member.id,
                        member.name,
                        member.email,
                        member.joined_date.format(&Rfc3339)?,
                        member.team_count,
                        member.total_investment.normalize(),
                        member.status
                    ]);
                }
            }
            if report.is_empty() {
                output.push_str("\nno members");
            } else {
                output.push('\n');
                output.push_str(&members.to_string());
            }
        }

        Ok(output)
    }
}

fn table_format() -> TableFormat {
    FormatBuilder::new()
        .padding(0, 2)
        .separator(LinePosition::Title, LineSeparator::new('-', '+', '+', '+'))
        .build()
}
