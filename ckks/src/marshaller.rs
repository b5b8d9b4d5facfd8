use crate::ciphertext::Ciphertext;
use crate::context::Context;
use crate::keys::{EvaluationKey, PublicKey, RotationKeys, SecretKey, SwitchingKey};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use math::poly::PolyRNS;
use math::ring::RingRNS;
use std::io::{Error, ErrorKind, Read, Result, Write};

fn write_poly<W: Write>(writer: &mut W, poly: &PolyRNS<u64>) -> Result<()> {
    for row in poly.0.iter() {
        for &x in row.0.iter() {
            writer.write_u64::<LittleEndian>(x)?;
        }
    }
    Ok(())
}

fn read_poly<R: Read>(reader: &mut R, poly: &mut PolyRNS<u64>) -> Result<()> {
    for row in poly.0.iter_mut() {
        for x in row.0.iter_mut() {
            *x = reader.read_u64::<LittleEndian>()?;
        }
    }
    Ok(())
}

impl Ciphertext {
    /// Serializes as: degree (1 byte), level (1 byte), scale (8
    /// bytes), is_ntt (1 byte), then the degree+1 polynomials as
    /// row-major u64 residues over the live rows.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.0.degree() as u8)?;
        writer.write_u8(self.level() as u8)?;
        writer.write_u64::<LittleEndian>(self.scale() as u64)?;
        writer.write_u8(self.0.is_ntt as u8)?;
        for poly in self.0.value.iter() {
            write_poly(writer, poly)?;
        }
        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R, context: &Context) -> Result<Ciphertext> {
        let degree: usize = reader.read_u8()? as usize;
        if degree == 0 {
            return Err(Error::new(ErrorKind::InvalidData, "ciphertext degree cannot be 0"));
        }
        let level: usize = reader.read_u8()? as usize;
        if level > context.max_level() {
            return Err(Error::new(ErrorKind::InvalidData, "ciphertext level too large"));
        }
        let scale: usize = reader.read_u64::<LittleEndian>()? as usize;
        let is_ntt: bool = reader.read_u8()? != 0;
        let mut ct: Ciphertext = Ciphertext::new(context, degree, level, scale);
        for poly in ct.0.value.iter_mut() {
            read_poly(reader, poly)?;
        }
        ct.0.is_ntt = is_ntt;
        Ok(ct)
    }
}

impl SecretKey {
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_poly(writer, &self.sk)
    }

    pub fn read_from<R: Read>(reader: &mut R, context: &Context) -> Result<SecretKey> {
        let mut sk: PolyRNS<u64> = context.ring_q().new_polyrns();
        read_poly(reader, &mut sk)?;
        Ok(SecretKey { sk })
    }
}

impl PublicKey {
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_poly(writer, &self.pk.0)?;
        write_poly(writer, &self.pk.1)
    }

    pub fn read_from<R: Read>(reader: &mut R, context: &Context) -> Result<PublicKey> {
        let ring_q: &RingRNS<u64> = context.ring_q();
        let mut b: PolyRNS<u64> = ring_q.new_polyrns();
        let mut a: PolyRNS<u64> = ring_q.new_polyrns();
        read_poly(reader, &mut b)?;
        read_poly(reader, &mut a)?;
        Ok(PublicKey { pk: (b, a) })
    }
}

impl SwitchingKey {
    /// Serializes as: log_base (1 byte), modulus count (1 byte), then
    /// per modulus the digit count (1 byte) and the key pairs.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.log_base as u8)?;
        writer.write_u8(self.key.len() as u8)?;
        for digits in self.key.iter() {
            writer.write_u8(digits.len() as u8)?;
            for (b, a) in digits.iter() {
                write_poly(writer, b)?;
                write_poly(writer, a)?;
            }
        }
        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R, context: &Context) -> Result<SwitchingKey> {
        let ring_q: &RingRNS<u64> = context.ring_q();
        let log_base: usize = reader.read_u8()? as usize;
        let levels: usize = reader.read_u8()? as usize;
        if levels != ring_q.level() + 1 {
            return Err(Error::new(ErrorKind::InvalidData, "modulus count mismatch"));
        }
        let mut key: Vec<Vec<(PolyRNS<u64>, PolyRNS<u64>)>> = Vec::with_capacity(levels);
        for _ in 0..levels {
            let bit_log: usize = reader.read_u8()? as usize;
            let mut digits: Vec<(PolyRNS<u64>, PolyRNS<u64>)> = Vec::with_capacity(bit_log);
            for _ in 0..bit_log {
                let mut b: PolyRNS<u64> = ring_q.new_polyrns();
                let mut a: PolyRNS<u64> = ring_q.new_polyrns();
                read_poly(reader, &mut b)?;
                read_poly(reader, &mut a)?;
                digits.push((b, a));
            }
            key.push(digits);
        }
        Ok(SwitchingKey { log_base, key })
    }
}

impl EvaluationKey {
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.key.write_to(writer)
    }

    pub fn read_from<R: Read>(reader: &mut R, context: &Context) -> Result<EvaluationKey> {
        Ok(EvaluationKey {
            key: SwitchingKey::read_from(reader, context)?,
        })
    }
}

impl RotationKeys {
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(self.rot_col_left.len() as u32)?;
        for (&k, key) in self.rot_col_left.iter() {
            writer.write_u32::<LittleEndian>(k as u32)?;
            key.write_to(writer)?;
        }
        writer.write_u32::<LittleEndian>(self.rot_col_right.len() as u32)?;
        for (&k, key) in self.rot_col_right.iter() {
            writer.write_u32::<LittleEndian>(k as u32)?;
            key.write_to(writer)?;
        }
        writer.write_u8(self.conjugate.is_some() as u8)?;
        if let Some(key) = &self.conjugate {
            key.write_to(writer)?;
        }
        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R, context: &Context) -> Result<RotationKeys> {
        let mut rot_keys: RotationKeys = RotationKeys::new();
        let count_left: usize = reader.read_u32::<LittleEndian>()? as usize;
        for _ in 0..count_left {
            let k: usize = reader.read_u32::<LittleEndian>()? as usize;
            rot_keys.rot_col_left.insert(k, SwitchingKey::read_from(reader, context)?);
        }
        let count_right: usize = reader.read_u32::<LittleEndian>()? as usize;
        for _ in 0..count_right {
            let k: usize = reader.read_u32::<LittleEndian>()? as usize;
            rot_keys.rot_col_right.insert(k, SwitchingKey::read_from(reader, context)?);
        }
        if reader.read_u8()? != 0 {
            rot_keys.conjugate = Some(SwitchingKey::read_from(reader, context)?);
        }
        Ok(rot_keys)
    }
}
