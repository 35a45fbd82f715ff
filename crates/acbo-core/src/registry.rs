//! Static catalog of demo data.
//!
//! Everything here is canned: scenarios with their baseline and optimized
//! payloads, the two pipeline step lists, the seeded insights and accuracy
//! series, and the supporting data for the quality lab, budget optimizer and
//! upload screens. Lookups never fail; unknown ids yield `None`.

use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::insight::{AccuracyPoint, InsightCategory, LearningInsight};
use crate::quality::QualityDimension;
use crate::query::{Evidence, ResultPayload};
use crate::scenario::{
    ChunkCandidate, DemoScenario, PipelineStep, ProcessingStage, QualityAttempt, StepStatus,
};

/// Scenario used when a free-form query runs without an active scenario.
pub const DEFAULT_SCENARIO_ID: &str = "insurance-claim";

/// Entities attached to every document the processing pipeline completes.
pub const SEEDED_DOCUMENT_ENTITIES: [&str; 4] = [
    "Policy Holder",
    "Coverage Amount",
    "Effective Date",
    "Exclusions",
];

/// A selectable domain on the domain picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainOption {
    pub id: String,
    pub description: String,
    pub enabled: bool,
}

/// Read-only access to the seeded catalog.
pub struct ScenarioRegistry;

impl ScenarioRegistry {
    pub fn scenarios() -> &'static [DemoScenario] {
        &SCENARIOS
    }

    pub fn find(id: &str) -> Option<&'static DemoScenario> {
        SCENARIOS.iter().find(|s| s.id == id)
    }

    pub fn default_scenario() -> &'static DemoScenario {
        // The catalog is a compile-time constant that always contains the default.
        SCENARIOS
            .iter()
            .find(|s| s.id == DEFAULT_SCENARIO_ID)
            .unwrap_or(&SCENARIOS[0])
    }

    pub fn domains() -> &'static [DomainOption] {
        &DOMAINS
    }

    pub fn insights() -> &'static [LearningInsight] {
        &INSIGHTS
    }

    pub fn accuracy_history() -> &'static [AccuracyPoint] {
        &ACCURACY_HISTORY
    }

    pub fn baseline_steps() -> &'static [PipelineStep] {
        &BASELINE_STEPS
    }

    pub fn optimized_steps() -> &'static [PipelineStep] {
        &OPTIMIZED_STEPS
    }

    pub fn processing_stages() -> &'static [ProcessingStage] {
        &PROCESSING_STAGES
    }

    pub fn quality_timeline() -> &'static [QualityAttempt] {
        &QUALITY_TIMELINE
    }

    pub fn chunk_candidates() -> &'static [ChunkCandidate] {
        &CHUNK_CANDIDATES
    }
}

// ============================================================================
// Seed data
// ============================================================================

const DIMENSIONS: [(&str, f64, &str); 6] = [
    ("Coverage", 0.8, "How well retrieved chunks cover the query scope"),
    ("Coherence", 0.75, "Logical flow and context consistency across chunks"),
    ("Sufficiency", 0.7, "Completeness of information for answering"),
    ("Distribution", 0.6, "Balance of sources and document coverage"),
    ("Redundancy", 0.5, "Low overlap and repetition between chunks"),
    ("Temporal", 0.7, "Relevance and recency of information"),
];

fn dimensions(scores: [f64; 6]) -> Vec<QualityDimension> {
    DIMENSIONS
        .iter()
        .zip(scores)
        .map(|((name, threshold, description), score)| {
            QualityDimension::new(*name, score, *threshold, *description)
        })
        .collect()
}

fn payload(
    response_text: &str,
    overall_quality_score: f64,
    tokens_used: u32,
    attempt_count: u32,
    scores: [f64; 6],
    evidence: Vec<Evidence>,
) -> ResultPayload {
    ResultPayload {
        response_text: response_text.to_string(),
        overall_quality_score,
        tokens_used,
        attempt_count,
        dimensions: dimensions(scores),
        evidence,
    }
}

static SCENARIOS: Lazy<Vec<DemoScenario>> = Lazy::new(|| {
    vec![
        DemoScenario {
            id: "insurance-claim".into(),
            display_name: "Insurance Claim Analysis".into(),
            domain: "Insurance".into(),
            query_text: "What are the coverage limits and exclusions for water damage claims under policy section 4.2?".into(),
            description: "Complex multi-document query requiring cross-referencing of policy sections".into(),
            baseline: payload(
                "Water damage coverage is mentioned in section 4. Some exclusions may apply...",
                0.42,
                8500,
                1,
                [0.42, 0.35, 0.48, 0.62, 0.55, 0.40],
                vec![Evidence::new(
                    "Section 4 describes property coverage in general terms...",
                    "Policy_2024_v3.pdf, Page 9",
                    0.61,
                )],
            ),
            optimized: payload(
                "Under Policy Section 4.2, water damage coverage includes: (1) Sudden and accidental discharge from plumbing systems up to $50,000, (2) Storm-related water intrusion with $2,500 deductible. Key exclusions: gradual seepage, flood (requires separate policy), and damage from lack of maintenance. The 2024 amendment (Doc 3, pg 12) added coverage for backup of sewers up to $10,000.",
                0.94,
                3200,
                2,
                [0.95, 0.92, 0.88, 0.91, 0.85, 0.94],
                vec![
                    Evidence::new(
                        "Water damage coverage includes sudden and accidental discharge...",
                        "Policy_2024_v3.pdf, Page 12",
                        0.94,
                    ),
                    Evidence::new(
                        "Exclusions apply to gradual seepage and flood conditions...",
                        "Coverage_Terms.docx, Section 4.2",
                        0.89,
                    ),
                    Evidence::new(
                        "2024 Amendment: Sewer backup coverage increased to $10,000...",
                        "Amendment_Jan2024.pdf, Page 3",
                        0.85,
                    ),
                ],
            ),
        },
        DemoScenario {
            id: "legal-contract".into(),
            display_name: "Legal Contract Review".into(),
            domain: "Legal".into(),
            query_text: "Identify all termination clauses and their triggering conditions across the merger agreement.".into(),
            description: "Multi-party contract analysis with complex cross-references".into(),
            baseline: payload(
                "The agreement contains termination provisions. Section 8 discusses some conditions...",
                0.38,
                9200,
                1,
                [0.38, 0.33, 0.41, 0.58, 0.52, 0.45],
                vec![Evidence::new(
                    "Article 8 sets out the circumstances under which...",
                    "Merger_Agreement.pdf, Page 41",
                    0.57,
                )],
            ),
            optimized: payload(
                "Termination clauses identified across 4 documents:\n\n1. **Material Adverse Effect (Section 8.1)**: Either party may terminate if MAC occurs, defined as >15% revenue decline or regulatory action.\n\n2. **Regulatory Failure (Section 8.2)**: Automatic termination if antitrust approval not received within 180 days. Break fee: $45M.\n\n3. **Mutual Consent (Section 8.3)**: Board approval required from both parties.\n\n4. **Fiduciary Out (Section 8.4)**: Target may terminate for superior proposal, subject to 5-day matching right and $30M termination fee.",
                0.96,
                2800,
                2,
                [0.97, 0.95, 0.93, 0.90, 0.88, 0.92],
                vec![
                    Evidence::new(
                        "A Material Adverse Effect shall be deemed to have occurred if...",
                        "Merger_Agreement.pdf, Section 8.1",
                        0.95,
                    ),
                    Evidence::new(
                        "If the Required Regulatory Approvals have not been obtained within 180 days...",
                        "Merger_Agreement.pdf, Section 8.2",
                        0.92,
                    ),
                    Evidence::new(
                        "The Company may terminate this Agreement to accept a Superior Proposal...",
                        "Disclosure_Schedule.pdf, Page 7",
                        0.87,
                    ),
                ],
            ),
        },
        DemoScenario {
            id: "financial-analysis".into(),
            display_name: "Financial Risk Assessment".into(),
            domain: "Financial".into(),
            query_text: "What is the overall risk exposure from derivative instruments and how has it changed year-over-year?".into(),
            description: "Quantitative analysis requiring temporal comparison".into(),
            baseline: payload(
                "Derivative positions are disclosed in the financial statements. Risk metrics vary...",
                0.35,
                7800,
                1,
                [0.35, 0.31, 0.37, 0.55, 0.50, 0.30],
                vec![Evidence::new(
                    "The Company uses derivative instruments to manage...",
                    "Annual_Report_FY2024.pdf, Page 88",
                    0.54,
                )],
            ),
            optimized: payload(
                "Derivative Risk Analysis (FY2023 vs FY2024):\n\n**Total Notional Value**: $2.4B → $2.1B (-12.5%)\n**VaR (99%, 1-day)**: $18.2M → $15.7M (-13.7%)\n\nBreakdown:\n- Interest Rate Swaps: $1.2B (hedging floating debt)\n- FX Forwards: $650M (EUR/USD exposure)\n- Commodity Futures: $250M (fuel hedging)\n\n**Key Changes**: Reduced FX exposure due to European divestiture. New SOFR transition completed. Credit risk from counterparties rated A- or higher.",
                0.92,
                3400,
                3,
                [0.93, 0.90, 0.91, 0.89, 0.86, 0.96],
                vec![
                    Evidence::new(
                        "Total notional amount of derivative instruments was $2.1 billion...",
                        "Annual_Report_FY2024.pdf, Note 14",
                        0.93,
                    ),
                    Evidence::new(
                        "Value-at-risk at the 99% confidence level decreased to $15.7 million...",
                        "Risk_Disclosures_FY2024.pdf, Page 22",
                        0.90,
                    ),
                    Evidence::new(
                        "Total notional amount of derivative instruments was $2.4 billion...",
                        "Annual_Report_FY2023.pdf, Note 14",
                        0.86,
                    ),
                ],
            ),
        },
    ]
});

static DOMAINS: Lazy<Vec<DomainOption>> = Lazy::new(|| {
    [
        ("Insurance", "Policy analysis, claims processing, coverage verification", true),
        ("Legal", "Contract review, compliance, regulatory analysis", true),
        ("Financial", "Risk assessment, financial statements, auditing", true),
        ("Medical", "Clinical documentation, research papers, patient records", true),
        ("Generic", "General-purpose document analysis", true),
        ("Custom", "Configure your own domain settings", false),
    ]
    .into_iter()
    .map(|(id, description, enabled)| DomainOption {
        id: id.into(),
        description: description.into(),
        enabled,
    })
    .collect()
});

static INSIGHTS: Lazy<Vec<LearningInsight>> = Lazy::new(|| {
    let now = Utc::now();
    vec![
        LearningInsight {
            id: "1".into(),
            category: InsightCategory::Pattern,
            description: "Queries about coverage limits benefit from including policy amendment dates".into(),
            impact_fraction: 0.15,
            timestamp: now - Duration::days(2),
            applied: true,
        },
        LearningInsight {
            id: "2".into(),
            category: InsightCategory::Optimization,
            description: "Reducing chunk overlap from 20% to 10% improved retrieval precision by 8%".into(),
            impact_fraction: 0.08,
            timestamp: now - Duration::days(1),
            applied: true,
        },
        LearningInsight {
            id: "3".into(),
            category: InsightCategory::Correction,
            description: "Auto-correction detected missing temporal context in financial queries".into(),
            impact_fraction: 0.12,
            timestamp: now - Duration::hours(5),
            applied: true,
        },
        LearningInsight {
            id: "4".into(),
            category: InsightCategory::Feedback,
            description: "User feedback indicates preference for structured output in legal queries".into(),
            impact_fraction: 0.18,
            timestamp: now - Duration::hours(2),
            applied: false,
        },
    ]
});

static ACCURACY_HISTORY: Lazy<Vec<AccuracyPoint>> = Lazy::new(|| {
    [
        (0.45, 0.72),
        (0.43, 0.78),
        (0.44, 0.82),
        (0.46, 0.85),
        (0.45, 0.89),
        (0.44, 0.91),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (baseline, optimized))| AccuracyPoint {
        label: format!("Week {}", i + 1),
        baseline,
        optimized,
    })
    .collect()
});

static BASELINE_STEPS: Lazy<Vec<PipelineStep>> = Lazy::new(|| {
    vec![
        PipelineStep::new("Retrieval", "Fetching top-k chunks by similarity", StepStatus::Success),
        PipelineStep::new("Coverage Check", "Coverage: 42% - Below threshold", StepStatus::Warning),
        PipelineStep::new("Coherence Check", "Coherence: 35% - Poor context flow", StepStatus::Error),
        PipelineStep::new("Generation", "Generating response with gaps", StepStatus::Warning),
    ]
});

static OPTIMIZED_STEPS: Lazy<Vec<PipelineStep>> = Lazy::new(|| {
    vec![
        PipelineStep::new("Budget Optimization", "Allocating tokens by quality weight", StepStatus::Success),
        PipelineStep::new("Quality Gate (Attempt 1)", "Coverage 68%, Coherence 72% - RETRY", StepStatus::Warning),
        PipelineStep::new("Auto-Correction", "Adding context chunks, rebalancing", StepStatus::Success),
        PipelineStep::new("Quality Gate (Attempt 2)", "All dimensions PASSED", StepStatus::Success),
        PipelineStep::new("Generation", "High-quality response with citations", StepStatus::Success),
    ]
});

static PROCESSING_STAGES: Lazy<Vec<ProcessingStage>> = Lazy::new(|| {
    [
        ("OCR & Text Extraction", "Extracting text from documents with high accuracy"),
        ("Entity Extraction", "Identifying named entities, dates, and key terms"),
        ("Embedding Generation", "Creating vector embeddings"),
        ("Vector Indexing", "Building the vector index for fast retrieval"),
        ("Graph Construction", "Creating knowledge graph relationships"),
        ("Quality Analysis", "Calculating chunk quality scores"),
    ]
    .into_iter()
    .map(|(name, description)| ProcessingStage {
        name: name.into(),
        description: description.into(),
    })
    .collect()
});

static QUALITY_TIMELINE: Lazy<Vec<QualityAttempt>> = Lazy::new(|| {
    let named = |scores: [f64; 6]| -> Vec<(String, f64)> {
        DIMENSIONS
            .iter()
            .zip(scores)
            .map(|((name, _, _), score)| (name.to_string(), score))
            .collect()
    };
    vec![
        QualityAttempt {
            attempt: 1,
            elapsed_label: "0.0s".into(),
            dimensions: named([0.68, 0.72, 0.65, 0.78, 0.82, 0.90]),
            passed: false,
            action: "Auto-correction triggered: Adding context chunks".into(),
        },
        QualityAttempt {
            attempt: 2,
            elapsed_label: "0.8s".into(),
            dimensions: named([0.95, 0.92, 0.88, 0.91, 0.85, 0.94]),
            passed: true,
            action: "All quality gates passed".into(),
        },
    ]
});

static CHUNK_CANDIDATES: Lazy<Vec<ChunkCandidate>> = Lazy::new(|| {
    [
        (1, "Water damage coverage under Section 4.2...", 0.94, 120, true),
        (2, "Policy exclusions for gradual seepage...", 0.89, 85, true),
        (3, "2024 Amendment: Sewer backup coverage...", 0.85, 95, true),
        (4, "Deductible requirements for water claims...", 0.78, 110, true),
        (5, "General policy terms and conditions...", 0.45, 150, false),
        (6, "Contact information and claims process...", 0.32, 180, false),
    ]
    .into_iter()
    .map(|(id, text, score, tokens, selected)| ChunkCandidate {
        id,
        text: text.into(),
        score,
        tokens,
        selected,
    })
    .collect()
});
