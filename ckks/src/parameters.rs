use crate::error::Error;

/// Public parameter set: ring degree, bit sizes of the modulus chain
/// (the level count is the chain length minus one), default scale in
/// log2 units, error standard deviation and gadget decomposition
/// base of the switching keys.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameters {
    pub log_n: usize,
    pub log_qi: Vec<u8>,
    pub log_scale: usize,
    pub sigma: f64,
    pub log_base: usize,
}

/// Preset labels into default_parameters().
pub const PN13LV4: usize = 0;
pub const PN14LV8: usize = 1;

pub fn default_parameters() -> Vec<Parameters> {
    vec![
        Parameters {
            log_n: 13,
            log_qi: vec![55, 49, 49, 49, 49],
            log_scale: 49,
            sigma: 3.2,
            log_base: 20,
        },
        Parameters {
            log_n: 14,
            log_qi: vec![55, 45, 45, 45, 45, 45, 45, 45, 45],
            log_scale: 45,
            sigma: 3.2,
            log_base: 20,
        },
    ]
}

impl Parameters {
    pub fn n(&self) -> usize {
        1 << self.log_n
    }

    pub fn levels(&self) -> usize {
        self.log_qi.len()
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.log_n < 4 || self.log_n > 16 {
            return Err(Error::InvalidRingDegree);
        }
        if self.log_qi.iter().any(|&s| s < 2 || s > 60) {
            return Err(Error::InvalidModulusSize);
        }
        if self.log_base < 1 || self.log_base > 60 {
            return Err(Error::InvalidBitDecomp);
        }
        Ok(())
    }
}
