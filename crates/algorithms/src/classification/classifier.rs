//! One classifier for both raster kinds
//!
//! Index producers differ per raster kind; rule evaluation is shared.

use super::presets::{rgb_rules, spectral_rules};
use super::rules::RuleSet;
use crate::imagery::{IndexProducer, RgbIndexCalculator, SpectralIndexCalculator};
use landclass_core::{
    Classification, EngineConfig, Error, IndexSet, MultiBandRaster, Outcome, PixelImage, Raster,
};

/// Labels pixels of an [`IndexSet`] with an ordered rule tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Classifier {
    rules: RuleSet,
}

impl Classifier {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Classifier for RGB photographs, thresholds from `config.rgb`
    pub fn rgb(config: &EngineConfig) -> Self {
        Self::new(rgb_rules(&config.rgb))
    }

    /// Classifier for spectral composites, thresholds from `config.spectral`
    pub fn spectral(config: &EngineConfig) -> Self {
        Self::new(spectral_rules(&config.spectral))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Label every pixel.
    ///
    /// Never fails: an empty index set, or one missing an index the rules
    /// read, yields an all-background raster of the set's declared shape,
    /// marked degraded.
    pub fn classify(&self, indices: &IndexSet) -> Outcome<Classification> {
        let (rows, cols) = indices.shape().unwrap_or((0, 0));
        let background = || Raster::<u8>::new(rows, cols);

        if indices.is_empty() {
            return Outcome::degraded(background(), Error::EmptyInput("index set is empty"));
        }

        match self.rules.evaluate(indices) {
            Ok(labels) => Outcome::Complete(labels),
            Err(e) => Outcome::degraded(background(), e),
        }
    }

    /// Produce indices from `source` and classify them.
    ///
    /// A degraded index set degrades the classification with the producer's
    /// reason.
    pub fn classify_source<P: IndexProducer>(
        &self,
        producer: &P,
        source: &P::Source,
    ) -> Outcome<Classification> {
        match producer.indices(source) {
            Outcome::Complete(indices) => self.classify(&indices),
            Outcome::Degraded { value, reason } => {
                let labels = self.classify(&value).into_value();
                Outcome::Degraded {
                    value: labels,
                    reason,
                }
            }
        }
    }
}

/// Classify an 8-bit gray, RGB or RGBA photograph.
pub fn classify_rgb_image(image: &PixelImage, config: &EngineConfig) -> Outcome<Classification> {
    Classifier::rgb(config).classify_source(&RgbIndexCalculator, image)
}

/// Classify a multispectral composite.
///
/// Uses index bands already appended to `raster` when all four are
/// present; otherwise derives them from the reflectance bands.
pub fn classify_spectral(raster: &MultiBandRaster, config: &EngineConfig) -> Outcome<Classification> {
    let classifier = Classifier::spectral(config);
    let appended = match raster.index_set() {
        Ok(set) => set,
        Err(reason) => {
            let (rows, cols) = raster.shape().unwrap_or((0, 0));
            return Outcome::degraded(Classification::new(rows, cols), reason);
        }
    };
    if classifier
        .rules()
        .required_indices()
        .iter()
        .all(|k| appended.contains(*k))
    {
        return classifier.classify(&appended);
    }
    classifier.classify_source(&SpectralIndexCalculator::default(), raster)
}
