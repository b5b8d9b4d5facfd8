use crate::error::Error;

/// Public parameter set: ring degree, plaintext modulus, bit sizes of
/// the ciphertext modulus chain Q and of the extension chain P used
/// for the tensoring, error standard deviation and the base of the
/// gadget decomposition used by the switching keys.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameters {
    pub log_n: usize,
    pub t: u64,
    pub log_qi: Vec<u8>,
    pub log_pi: Vec<u8>,
    pub sigma: f64,
    pub log_base: usize,
}

/// Preset labels into default_parameters().
pub const PN12QP171: usize = 0;
pub const PN13QP339: usize = 1;
pub const PN14QP676: usize = 2;

/// Default parameter sets, named after the ring degree and the total
/// bit size of the modulus chain QP. The extension chain P carries
/// log2(Q) + log2(n) + 2 bits or more, so that the tensoring over QP
/// never wraps and the t/Q rounding is faithful.
pub fn default_parameters() -> Vec<Parameters> {
    vec![
        Parameters {
            log_n: 12,
            t: 65537,
            log_qi: vec![39, 39],
            log_pi: vec![47, 46],
            sigma: 3.2,
            log_base: 20,
        },
        Parameters {
            log_n: 13,
            t: 65537,
            log_qi: vec![54, 54, 54],
            log_pi: vec![59, 59, 59],
            sigma: 3.2,
            log_base: 27,
        },
        Parameters {
            log_n: 14,
            t: 65537,
            log_qi: vec![56, 55, 55, 54, 54, 54],
            log_pi: vec![58, 58, 58, 58, 58, 58],
            sigma: 3.2,
            log_base: 28,
        },
    ]
}

impl Parameters {
    pub fn n(&self) -> usize {
        1 << self.log_n
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.log_n < 4 || self.log_n > 16 {
            return Err(Error::InvalidRingDegree);
        }
        if self
            .log_qi
            .iter()
            .chain(self.log_pi.iter())
            .any(|&s| s < 2 || s > 60)
        {
            return Err(Error::InvalidModulusSize);
        }
        if self.log_base < 1 || self.log_base > 60 {
            return Err(Error::InvalidBitDecomp);
        }
        Ok(())
    }
}
