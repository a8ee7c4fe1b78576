//! Tiered consensus pipeline

use crate::arbitration::Arbitrator;
use crate::escalation::{Escalation, EscalationEvent, EscalationState};
use crate::{ConfigError, PipelineConfig, PipelineError, StateSnapshot};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use tribunal_cache::CacheCounters;
use tribunal_consensus::{
    Bucket, ConsensusComputer, ConsensusInputs, ReliableWitnessLocator, ScoreBreakdown,
};
use tribunal_domain::{
    ContradictionLikelihood, EvidencePacket, EvidenceSource, ExecutionPlanBuilder,
    JudicialRecord, Label, Premise, Responder, ResponderSet, TierStage, TierTwoResult, Witness,
};
use tribunal_ensemble::{CallTelemetry, SafeExecutor, TierOneEnsemble};
use tribunal_evidence::EvidenceEngine;
use tribunal_llm::{ModelAssurance, OllamaResponder, SimulatedResponder};
use tribunal_premise::PremiseStructurer;
use tribunal_synthesizer::Synthesizer;
use tribunal_validator::{ContradictionDetector, GateSignals};
use uuid::Uuid;

/// One query to adjudicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Raw query text
    pub query: String,

    /// Logical clock value for the snapshot; assigned by the pipeline when absent
    pub timestamp: Option<u64>,

    /// Declared contradiction likelihood
    pub likelihood: ContradictionLikelihood,
}

impl QueryRequest {
    /// Create a request with a pipeline-assigned timestamp
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            timestamp: None,
            likelihood: ContradictionLikelihood::Normal,
        }
    }

    /// Pin the snapshot timestamp
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Declare the contradiction likelihood
    pub fn with_likelihood(mut self, likelihood: ContradictionLikelihood) -> Self {
        self.likelihood = likelihood;
        self
    }
}

/// Volatile per-run data kept out of the snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunTelemetry {
    /// Log correlation id
    pub run_id: Uuid,

    /// Latency and tokens of every Tier-1 call
    pub tier1_calls: Vec<CallTelemetry>,

    /// Latency and tokens of the arbitration call
    pub arbitration: Option<CallTelemetry>,

    /// Why Tier-2 ran, if it did
    pub tier2_trigger: Option<String>,

    /// Result of the narrowed retry, if it ran
    pub narrowed_retry: Option<TierTwoResult>,

    /// Qualitative bucket of the score
    pub bucket: Bucket,

    /// Weighted score contributions
    pub breakdown: ScoreBreakdown,

    /// Tier-1 batch cache counters after the run
    pub cache: CacheCounters,

    /// Escalation states visited
    pub escalation_path: Vec<EscalationState>,

    /// Responders dropped by the health check
    pub excluded_responders: Vec<String>,
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Hashable record of the run
    pub snapshot: StateSnapshot,

    /// Hex SHA-256 of the canonical snapshot
    pub digest: String,

    /// Synthesized answer
    pub answer: String,

    /// Selected witness
    pub witness: Witness,

    /// Where the escalation ladder stopped
    pub final_state: EscalationState,

    /// Volatile telemetry
    pub telemetry: RunTelemetry,
}

/// Builder for [`ConsensusPipeline`]
pub struct ConsensusPipelineBuilder {
    config: PipelineConfig,
    assurance: Arc<ModelAssurance>,
    responders: ResponderSet,
    arbiter: Option<Arc<dyn Responder>>,
    evidence_sources: Vec<Arc<dyn EvidenceSource>>,
}

impl ConsensusPipelineBuilder {
    fn new(config: PipelineConfig) -> Self {
        let assurance = Arc::new(ModelAssurance::new(config.assurance.clone()));
        Self {
            config,
            assurance,
            responders: ResponderSet::new(),
            arbiter: None,
            evidence_sources: Vec::new(),
        }
    }

    /// Add a Tier-1 responder, keyed by its model id
    pub fn responder(mut self, responder: Arc<dyn Responder>) -> Self {
        self.responders
            .insert(responder.model_id().to_string(), responder);
        self
    }

    /// Set the Tier-4 arbiter
    pub fn arbiter(mut self, arbiter: Arc<dyn Responder>) -> Self {
        self.arbiter = Some(arbiter);
        self
    }

    /// Add an evidence source
    pub fn evidence_source(mut self, source: Arc<dyn EvidenceSource>) -> Self {
        self.evidence_sources.push(source);
        self
    }

    /// Add simulated responders sharing the pipeline's assurance layer
    pub fn with_simulated_responders<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let responder = SimulatedResponder::new(name, Arc::clone(&self.assurance));
            self = self.responder(Arc::new(responder));
        }
        self
    }

    /// Use a simulated arbiter sharing the pipeline's assurance layer
    pub fn with_simulated_arbiter(self, name: impl Into<String>) -> Self {
        let arbiter = SimulatedResponder::new(name, Arc::clone(&self.assurance));
        self.arbiter(Arc::new(arbiter))
    }

    /// Add the responders and arbiter named in the configuration
    ///
    /// Simulated when `simulation` is set, Ollama models otherwise.
    pub fn with_configured_responders(self) -> Self {
        let names = self.config.responders.clone();
        let arbiter = self.config.arbiter.clone();

        if self.config.simulation {
            return self
                .with_simulated_responders(names)
                .with_simulated_arbiter(arbiter);
        }

        let endpoint = self.config.ollama_endpoint.clone();
        let builder = names.into_iter().fold(self, |builder, name| {
            builder.responder(Arc::new(OllamaResponder::new(endpoint.clone(), name)))
        });
        builder.arbiter(Arc::new(OllamaResponder::new(endpoint, arbiter)))
    }

    /// Validate the configuration and assemble the pipeline
    pub fn build(self) -> Result<ConsensusPipeline, ConfigError> {
        self.config.validate()?;
        let config = self.config;

        let executor = SafeExecutor::new(config.error_budget)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let evidence = self
            .evidence_sources
            .into_iter()
            .fold(EvidenceEngine::new(config.evidence.clone()), |engine, source| {
                engine.with_source(source)
            });
        let arbitrator = self
            .arbiter
            .map(|arbiter| Arbitrator::new(arbiter, config.audit_min_confidence));

        info!(
            responders = self.responders.len(),
            arbiter = arbitrator.is_some(),
            evidence_sources = evidence.source_count(),
            simulation = config.simulation,
            "pipeline built"
        );

        Ok(ConsensusPipeline {
            structurer: PremiseStructurer::from_config(&config.premise),
            ensemble: TierOneEnsemble::new(executor, config.cache.clone()),
            detector: ContradictionDetector::new(config.validator.clone()),
            evidence,
            consensus: ConsensusComputer::new(config.consensus.clone()),
            synthesizer: Synthesizer::new(config.synthesis),
            responders: self.responders,
            arbitrator,
            assurance: self.assurance,
            clock: AtomicU64::new(0),
            config,
        })
    }
}

/// Runs queries through the tiered consensus ladder
///
/// Stages run in order, once per query:
/// 1. Premise structuring
/// 2. Tier-1 ensemble (cached per claim set)
/// 3. Tier-2 contradiction check, when the gate opens
/// 4. Narrowed retry, at most once
/// 5. Tier-3 evidence, when the retry did not resolve
/// 6. Tier-4 arbitration, when evidence did not verify
/// 7. Witness selection, consensus scoring, synthesis
///
/// Different queries may run concurrently on one pipeline; the only shared
/// state is the premise memo, the batch cache and the assurance layer.
pub struct ConsensusPipeline {
    config: PipelineConfig,
    structurer: PremiseStructurer,
    ensemble: TierOneEnsemble,
    detector: ContradictionDetector,
    evidence: EvidenceEngine,
    consensus: ConsensusComputer,
    synthesizer: Synthesizer,
    responders: ResponderSet,
    arbitrator: Option<Arbitrator>,
    assurance: Arc<ModelAssurance>,
    clock: AtomicU64,
}

impl std::fmt::Debug for ConsensusPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsensusPipeline")
            .field("config", &self.config)
            .field("responders", &self.responders.keys().collect::<Vec<_>>())
            .field("arbitrator", &self.arbitrator)
            .field("evidence", &self.evidence)
            .finish()
    }
}

impl ConsensusPipeline {
    /// Start building a pipeline
    pub fn builder(config: PipelineConfig) -> ConsensusPipelineBuilder {
        ConsensusPipelineBuilder::new(config)
    }

    /// Get the configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Names of the registered Tier-1 responders
    pub fn responder_names(&self) -> Vec<&str> {
        self.responders.keys().map(String::as_str).collect()
    }

    /// Shared assurance layer
    pub fn assurance(&self) -> &Arc<ModelAssurance> {
        &self.assurance
    }

    /// Tier-1 batch cache counters
    pub fn cache_counters(&self) -> CacheCounters {
        self.ensemble.cache_counters()
    }

    /// Administrative reset of every process-wide table
    pub fn reset_caches(&self) {
        self.structurer.clear();
        self.ensemble.clear_cache();
        self.assurance.reset();
        info!("pipeline caches reset");
    }

    /// Adjudicate one query
    pub async fn run(&self, request: QueryRequest) -> Result<PipelineOutcome, PipelineError> {
        let run_id = Uuid::now_v7();
        let span = info_span!("pipeline_run", %run_id);
        self.execute(request, run_id).instrument(span).await
    }

    async fn execute(
        &self,
        request: QueryRequest,
        run_id: Uuid,
    ) -> Result<PipelineOutcome, PipelineError> {
        let timestamp = self.timestamp_for(&request);
        let mut plan = ExecutionPlanBuilder::new(request.likelihood, self.config.simulation);

        let psl = self.structurer.structure(&request.query);
        plan.record(TierStage::Premises);
        debug!(claims = psl.len(), "premises structured");

        // Tier 1
        let (responders, excluded) = self.available_responders().await;
        let batch = self.ensemble.run(Arc::clone(&psl), &responders).await?;
        plan.record(TierStage::Ensemble);

        if !psl.is_empty() && batch.responders() < self.config.quorum {
            warn!(
                got = batch.responders(),
                need = self.config.quorum,
                "quorum not reached"
            );
            return Err(PipelineError::QuorumNotReached {
                got: batch.responders(),
                need: self.config.quorum,
            });
        }

        // Tiers 2-4
        let trigger = self.detector.trigger(&GateSignals {
            input: &request.query,
            prior_contradictions: batch.disagreements,
            likelihood: request.likelihood,
            mean_confidence: batch.mean_confidence,
        });

        let mut escalation = Escalation::new();
        let mut tier2: Option<TierTwoResult> = None;
        let mut narrowed: Option<TierTwoResult> = None;
        let mut packet: Option<EvidencePacket> = None;
        let mut judicial: Option<JudicialRecord> = None;
        let mut arbitration_call = None;

        while let Some(stage) = escalation.state().next_stage() {
            let event = match stage {
                TierStage::Contradiction => match &trigger {
                    None => {
                        info!("tier-2 skipped: gate closed");
                        EscalationEvent::NoContradictions
                    }
                    Some(reason) => {
                        info!(trigger = %reason, "tier-2 entered");
                        plan.record(TierStage::Contradiction);
                        let result = self.detector.detect(&psl)?;
                        let event = if result.accepted {
                            EscalationEvent::NoContradictions
                        } else {
                            EscalationEvent::ContradictionsDetected
                        };
                        tier2 = Some(result);
                        event
                    }
                },
                TierStage::NarrowedRetry => {
                    plan.record(TierStage::NarrowedRetry);
                    let retry = self.detector.narrowed_retry(&psl)?;
                    let event = if retry.accepted {
                        // The narrowed result supersedes the one that escalated
                        tier2 = Some(retry.clone());
                        EscalationEvent::RetrySucceeded
                    } else {
                        EscalationEvent::RetryFailed
                    };
                    narrowed = Some(retry);
                    event
                }
                TierStage::Evidence => {
                    info!("tier-3 entered");
                    plan.record(TierStage::Evidence);
                    let gathered = self.evidence.gather(&psl).await;
                    let event = if gathered.is_verified() {
                        EscalationEvent::EvidenceVerified
                    } else {
                        EscalationEvent::EvidenceInsufficient
                    };
                    packet = Some(gathered);
                    event
                }
                TierStage::Arbitration => {
                    let Some(arbitrator) = &self.arbitrator else {
                        warn!("tier-4 needed but no arbiter is configured");
                        break;
                    };
                    info!(arbiter = %arbitrator.model_id(), "tier-4 entered");
                    plan.record(TierStage::Arbitration);
                    let conflicts = packet
                        .as_ref()
                        .map(|p| p.conflicts_detected.as_slice())
                        .unwrap_or_default();
                    let (record, call) = arbitrator.arbitrate(&request.query, conflicts).await?;
                    judicial = Some(record);
                    arbitration_call = Some(call);
                    EscalationEvent::Arbitrated
                }
                _ => break,
            };
            escalation.apply(event)?;
        }

        // Witness
        let candidates: Vec<Witness> = responders
            .iter()
            .filter(|(name, _)| batch.entries.contains_key(*name))
            .filter_map(|(name, responder)| {
                Witness::new(name.clone(), sanitize_reliability(responder.reliability())).ok()
            })
            .collect();
        let witness = ReliableWitnessLocator::select(&candidates);
        plan.record(TierStage::Witness);

        // Consensus
        let report = self.consensus.compute(&ConsensusInputs {
            tier1: &batch.entries,
            tier2: tier2.as_ref(),
            evidence: packet.as_ref(),
            arbitrated: judicial.is_some(),
            witness: &witness,
        });
        plan.record(TierStage::Consensus);

        // Synthesis
        let facts = verified_facts(&psl, packet.as_ref(), judicial.as_ref());
        let answer = self.synthesizer.synthesize(&facts);
        plan.record(TierStage::Synthesis);

        let snapshot = StateSnapshot {
            psl: psl.as_ref().clone(),
            tier1: batch.entries.clone(),
            tier2,
            reality_packet: packet,
            judicial,
            consensus_score: report.result,
            execution_plan: plan.freeze(),
            timestamp,
        };
        snapshot.validate()?;
        let digest = snapshot.digest()?;

        info!(
            grade = %snapshot.consensus_score.grade,
            score = snapshot.consensus_score.score,
            state = %escalation.state(),
            digest = %digest,
            "run complete"
        );

        Ok(PipelineOutcome {
            digest,
            answer,
            witness,
            final_state: escalation.state(),
            telemetry: RunTelemetry {
                run_id,
                tier1_calls: batch.telemetry.clone(),
                arbitration: arbitration_call,
                tier2_trigger: trigger.map(|t| t.to_string()),
                narrowed_retry: narrowed,
                bucket: report.bucket,
                breakdown: report.breakdown,
                cache: self.ensemble.cache_counters(),
                escalation_path: escalation.path().to_vec(),
                excluded_responders: excluded,
            },
            snapshot,
        })
    }

    /// Caller-supplied timestamp, or the next tick of the logical clock
    fn timestamp_for(&self, request: &QueryRequest) -> u64 {
        match request.timestamp {
            Some(timestamp) => {
                self.clock.fetch_max(timestamp, Ordering::SeqCst);
                timestamp
            }
            None => self.clock.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }

    /// Responders that may take part in Tier-1
    ///
    /// Simulated responders are always used; otherwise unhealthy ones are
    /// dropped and returned separately.
    async fn available_responders(&self) -> (ResponderSet, Vec<String>) {
        if self.config.simulation {
            return (self.responders.clone(), Vec::new());
        }

        let mut healthy = ResponderSet::new();
        let mut excluded = Vec::new();
        for (name, responder) in &self.responders {
            if responder.health_check().await {
                healthy.insert(name.clone(), Arc::clone(responder));
            } else {
                warn!(model = %name, "responder failed health check, excluded");
                excluded.push(name.clone());
            }
        }
        (healthy, excluded)
    }
}

fn sanitize_reliability(reliability: f64) -> f64 {
    if reliability.is_nan() {
        0.0
    } else {
        reliability.clamp(0.0, 1.0)
    }
}

/// Facts handed to synthesis, most authoritative source first
fn verified_facts(
    psl: &[Premise],
    packet: Option<&EvidencePacket>,
    judicial: Option<&JudicialRecord>,
) -> Vec<String> {
    if let Some(record) = judicial.filter(|r| r.audit_passed) {
        return vec![record.verdict.clone()];
    }
    if let Some(packet) = packet {
        return packet.verified_facts.clone();
    }
    psl.iter()
        .filter(|p| p.label == Label::True)
        .map(|p| p.text.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> Vec<Premise> {
        vec![
            Premise::new("The engine is deterministic", Label::True),
            Premise::new("It never calls external APIs", Label::False),
        ]
    }

    #[test]
    fn test_facts_prefer_audited_verdict() {
        let record = JudicialRecord {
            model_id: "judge".to_string(),
            verdict: "It is deterministic".to_string(),
            confidence: 0.9,
            audit_passed: true,
        };
        let packet = EvidencePacket::new(vec!["x".to_string()], Vec::new(), 1.0, 0.4);

        assert_eq!(
            verified_facts(&claims(), Some(&packet), Some(&record)),
            vec!["It is deterministic"]
        );

        let failed = JudicialRecord {
            audit_passed: false,
            ..record
        };
        assert_eq!(verified_facts(&claims(), Some(&packet), Some(&failed)), vec!["x"]);
        assert_eq!(
            verified_facts(&claims(), None, None),
            vec!["The engine is deterministic"]
        );
    }

    #[test]
    fn test_sanitize_reliability() {
        assert_eq!(sanitize_reliability(f64::NAN), 0.0);
        assert_eq!(sanitize_reliability(1.7), 1.0);
        assert_eq!(sanitize_reliability(-0.2), 0.0);
        assert_eq!(sanitize_reliability(0.4), 0.4);
    }

    #[test]
    fn test_logical_clock() {
        let pipeline = ConsensusPipeline::builder(PipelineConfig::default())
            .build()
            .unwrap();

        assert_eq!(pipeline.timestamp_for(&QueryRequest::new("a")), 1);
        assert_eq!(pipeline.timestamp_for(&QueryRequest::new("a")), 2);
        assert_eq!(
            pipeline.timestamp_for(&QueryRequest::new("a").with_timestamp(10)),
            10
        );
        assert_eq!(pipeline.timestamp_for(&QueryRequest::new("a")), 11);
    }

    #[test]
    fn test_configured_responders() {
        let pipeline = ConsensusPipeline::builder(PipelineConfig::default())
            .with_configured_responders()
            .build()
            .unwrap();
        assert_eq!(pipeline.responder_names(), vec!["alpha", "beta"]);
        assert!(pipeline.arbitrator.is_some());

        let config = PipelineConfig {
            quorum: 0,
            ..Default::default()
        };
        assert!(ConsensusPipeline::builder(config).build().is_err());
    }
}
