//! The monitor engine: wires the cohort clock, filters and every
//! aggregation engine into one serializable report.
//!
//! SCOPE PER SECTION:
//!   - Monitor panel: filtered view
//!   - Executive summary: full record set
//!   - Insights (heatmap, Pareto, amount bins): full record set
//!   - Export: filtered view
//!
//! RULES:
//!   - The clock is computed once, from the full record set.
//!   - Nothing here mutates the dataset; every call recomputes.

use crate::{
    binning::{amount_profile, AmountProfile},
    clock::{ClockSnapshot, CohortClock},
    config::MonitorConfig,
    export::{export_summary, ExportRow, ExportSummary},
    filter::FilterSelection,
    pareto::{pareto, ParetoReport},
    ranking::{rank_branches, risk_matrix, BranchRanking, RankingParams, RiskMatrix},
    record::Record,
    store::Dataset,
    summary::{
        branch_comparison, product_summary, regional_extremes, regional_heatmap, BranchComparison,
        Extremes, ProductSummary, RegionalHeatmap,
    },
    trends::{
        channel_trend, client_type_evolution, global_trend, indicator_history, year_over_year,
        IndicatorPoint, TrendPoint, YearOverYearPoint,
    },
};
use serde::Serialize;
use std::sync::Arc;

pub struct FpdMonitor {
    pub clock: CohortClock,
    config: MonitorConfig,
    dataset: Arc<Dataset>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonitorPanel {
    pub is_empty: bool,
    pub global_trend: Vec<TrendPoint>,
    pub channel_trend: Vec<TrendPoint>,
    pub ranking: Option<BranchRanking>,
    pub worst_branch_matrix: Option<RiskMatrix>,
    pub year_over_year: Vec<YearOverYearPoint>,
    pub indicator_history: Vec<IndicatorPoint>,
    pub client_type_evolution: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutiveSummary {
    pub regions: Option<Extremes>,
    pub products: Option<ProductSummary>,
    pub branches: Option<BranchComparison>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Insights {
    pub heatmap: Option<RegionalHeatmap>,
    pub pareto: Option<ParetoReport>,
    pub amount_profile: Option<AmountProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportSection {
    pub summary: ExportSummary,
    pub rows: Vec<ExportRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonitorReport {
    pub clock: ClockSnapshot,
    pub selection: FilterSelection,
    pub records_total: usize,
    pub records_selected: usize,
    pub panel: MonitorPanel,
    /// `None` with fewer than two mature cohorts.
    pub executive: Option<ExecutiveSummary>,
    pub insights: Insights,
    pub export: ExportSection,
}

impl FpdMonitor {
    pub fn new(dataset: Arc<Dataset>, config: MonitorConfig) -> Self {
        let clock = CohortClock::new(dataset.cohorts(), config.maturity_lag, config.window_size);
        log::info!(
            "Cohort clock: {} cohorts, current {:?}, next {:?}",
            clock.all_cohorts.len(),
            clock.current_cohort(),
            clock.next_cohort()
        );
        Self { clock, config, dataset }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn all_records(&self) -> Vec<&Record> {
        self.dataset.records.iter().collect()
    }

    pub fn filtered(&self, selection: &FilterSelection) -> Vec<&Record> {
        selection.apply(&self.dataset.records)
    }

    pub fn ranking_params(&self) -> RankingParams<'_> {
        RankingParams {
            min_sample: self.config.min_sample,
            top_n: self.config.top_n,
            exclusions: &self.config.branch_exclusions,
        }
    }

    /// Ranking of the current cohort; `None` without a mature cohort.
    pub fn branch_ranking(&self, view: &[&Record]) -> Option<BranchRanking> {
        let cohort = self.clock.current_cohort()?;
        Some(rank_branches(view, cohort, &self.ranking_params()))
    }

    /// Branch × product breakdown of the ranking's worst branches.
    pub fn worst_branch_matrix(&self, view: &[&Record], ranking: &BranchRanking) -> RiskMatrix {
        risk_matrix(
            view,
            &ranking.cohort,
            &ranking.worst_branches(),
            &self.config.branch_exclusions,
        )
    }

    pub fn pareto(&self, view: &[&Record]) -> Option<ParetoReport> {
        let cohort = self.clock.current_cohort()?;
        Some(pareto(view, cohort, self.config.pareto_threshold, &self.config.branch_exclusions))
    }

    pub fn amount_profile(&self, view: &[&Record]) -> Option<AmountProfile> {
        let cohort = self.clock.current_cohort()?;
        Some(amount_profile(view, cohort, &self.config.amount_bin_edges))
    }

    pub fn monitor_panel(&self, view: &[&Record]) -> MonitorPanel {
        let window = self.clock.visualization_window();
        let ranking = self.branch_ranking(view).filter(|r| !r.is_empty());
        let worst_branch_matrix = ranking
            .as_ref()
            .map(|r| self.worst_branch_matrix(view, r))
            .filter(|m| !m.is_empty());
        MonitorPanel {
            is_empty: view.is_empty(),
            global_trend: global_trend(view, window),
            channel_trend: channel_trend(view, window, &self.config.channel_split),
            ranking,
            worst_branch_matrix,
            year_over_year: year_over_year(view, self.clock.mature_cohorts(), self.config.yoy_years),
            indicator_history: indicator_history(view, window),
            client_type_evolution: client_type_evolution(
                view,
                window,
                &self.config.client_type_exclusions,
            ),
        }
    }

    pub fn executive_summary(&self) -> Option<ExecutiveSummary> {
        let (previous, current) = self.clock.adjacent_pair()?;
        let all = self.all_records();
        Some(ExecutiveSummary {
            regions: regional_extremes(&all, previous, &self.config.region_exclusions),
            products: product_summary(&all, previous, self.config.min_sample),
            branches: branch_comparison(
                &all,
                previous,
                current,
                self.config.min_sample,
                &self.config.branch_exclusions,
            ),
        })
    }

    pub fn insights(&self) -> Insights {
        let all = self.all_records();
        Insights {
            heatmap: regional_heatmap(
                &all,
                self.clock.mature_cohorts(),
                self.config.heatmap_cohorts,
                &self.config.region_exclusions,
            ),
            pareto: self.pareto(&all),
            amount_profile: self.amount_profile(&all),
        }
    }

    pub fn export(&self, view: &[&Record]) -> ExportSection {
        let (summary, rows) = export_summary(view, &self.clock, self.config.export_target);
        ExportSection { summary, rows }
    }

    /// Everything the presentation layer needs for one filter selection.
    pub fn report(&self, selection: &FilterSelection) -> MonitorReport {
        let view = self.filtered(selection);
        MonitorReport {
            clock: self.clock.snapshot(),
            selection: selection.clone(),
            records_total: self.dataset.len(),
            records_selected: view.len(),
            panel: self.monitor_panel(&view),
            executive: self.executive_summary(),
            insights: self.insights(),
            export: self.export(&view),
        }
    }
}
