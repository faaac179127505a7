// Copyright 2022 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

use std::io::SeekFrom;

use c2pa_crypto::cose::{signing_cert_info, verify_cose_sign1, CertificateInfo};
use log::{debug, error, warn};

use crate::{
    assertion::AssertionBase,
    assertions::{labels, DataHash, Ingredient},
    asset_io::{CAIRead, CAIReadWrite, HashBlockObjectType},
    claim::Claim,
    error::{Error, Result},
    hashed_uri::HashedUri,
    jumbf::{
        boxes::{JUMBFSuperBox, CAI_BLOCK_UUID},
        labels::{to_assertion_uri, to_manifest_uri, MANIFEST_STORE, SIGNATURE},
    },
    jumbf_io::{
        compose_manifest, handler_for, load_jumbf_from_stream, object_locations_from_stream,
        save_jumbf_to_stream,
    },
    settings::get_settings_value,
    signer::cose_sign,
    utils::{hash_utils::HashRange, io_utils::copy_stream},
    validation_status::{self, ValidationStatus},
    Signer,
};

// dummy exclusions reserved in a data hash placeholder
const EMBEDDED_EXCLUSION_SLOTS: usize = 1;
const DATA_HASHED_EXCLUSION_SLOTS: usize = 10;

// limit on re-signing passes while matching a caller's exclusion length
const MAX_EXCLUSION_FIXUPS: usize = 5;

/// A manifest store: every claim found in or destined for an asset.
///
/// Claims imported from ingredients come first; the provenance (active)
/// claim is the last one committed.
#[derive(Debug, Default)]
pub struct Store {
    claims: Vec<Claim>,
    provenance_label: Option<String>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn get_claim(&self, label: &str) -> Option<&Claim> {
        self.claims.iter().find(|c| c.label() == label)
    }

    pub fn provenance_label(&self) -> Option<&str> {
        self.provenance_label.as_deref()
    }

    pub fn provenance_claim(&self) -> Option<&Claim> {
        self.get_claim(self.provenance_label.as_deref()?)
    }

    fn provenance_claim_mut(&mut self) -> Result<&mut Claim> {
        let label = self.provenance_label.clone().ok_or(Error::ClaimEncoding)?;
        self.claims
            .iter_mut()
            .find(|c| c.label() == label)
            .ok_or(Error::ClaimMissing { label })
    }

    /// Add a claim and make it the provenance claim.
    pub fn commit_claim(&mut self, claim: Claim) -> Result<String> {
        if self.get_claim(claim.label()).is_some() {
            return Err(Error::InvalidClaim(format!(
                "duplicate manifest label {}",
                claim.label()
            )));
        }
        let label = claim.label().to_owned();
        self.claims.push(claim);
        self.provenance_label = Some(label.clone());
        Ok(label)
    }

    /// Copy the claims of an ingredient's store into this one, ahead of the
    /// provenance claim. Claims already present are skipped.
    pub fn import_claims(&mut self, ingredient_store: &Store) {
        let insert_at = match &self.provenance_label {
            Some(label) => self
                .claims
                .iter()
                .position(|c| c.label() == label)
                .unwrap_or(self.claims.len()),
            None => self.claims.len(),
        };

        let new_claims: Vec<Claim> = ingredient_store
            .claims
            .iter()
            .filter(|c| self.get_claim(c.label()).is_none())
            .cloned()
            .collect();

        for (i, claim) in new_claims.into_iter().enumerate() {
            self.claims.insert(insert_at + i, claim);
        }
    }

    /// Hashed reference to a claim's manifest box, as ingredients record it.
    pub fn manifest_hashed_uri(&self, label: &str, alg: &str) -> Result<HashedUri> {
        let claim = self.get_claim(label).ok_or_else(|| Error::ClaimMissing {
            label: label.to_owned(),
        })?;
        let box_bytes = claim.to_superbox()?.to_bytes()?;
        HashedUri::from_superbox_bytes(to_manifest_uri(label), alg, &box_bytes)
    }

    /// Serialize the store as a JUMBF `c2pa` superbox.
    pub fn to_jumbf(&self) -> Result<Vec<u8>> {
        let mut store = JUMBFSuperBox::new(MANIFEST_STORE, CAI_BLOCK_UUID)?;
        for claim in &self.claims {
            store.add_superbox(claim.to_superbox()?);
        }
        Ok(store.to_bytes()?)
    }

    /// Parse a JUMBF manifest store. The last manifest is the active one.
    pub fn from_jumbf(buffer: &[u8]) -> Result<Store> {
        let sb = JUMBFSuperBox::from_bytes(buffer)?;
        if sb.uuid() != CAI_BLOCK_UUID {
            return Err(Error::InvalidAsset("not a C2PA manifest store".to_owned()));
        }

        let mut store = Store::new();
        for manifest in sb.superboxes() {
            store.commit_claim(Claim::from_superbox(manifest)?)?;
        }

        if store.claims.is_empty() {
            return Err(Error::InvalidAsset("manifest store is empty".to_owned()));
        }
        Ok(store)
    }

    /// Load the store embedded in an asset stream.
    pub fn load_from_stream(format: &str, stream: &mut dyn CAIRead) -> Result<Store> {
        let jumbf = load_jumbf_from_stream(format, stream)?;
        Store::from_jumbf(&jumbf)
    }

    /// Summary of the certificate that signed a claim.
    pub fn signature_info(claim: &Claim) -> Option<CertificateInfo> {
        signing_cert_info(claim.signature_val()).ok()
    }

    /// Check every claim's signature and assertion references, and the
    /// provenance claim's data hash when an asset stream is supplied.
    ///
    /// Failures are returned as validation statuses. An empty list means the
    /// store is valid.
    pub fn verify_store(&self, asset: Option<&mut dyn CAIRead>) -> Vec<ValidationStatus> {
        let mut statuses = Vec::new();

        for claim in &self.claims {
            Self::verify_claim_signature(claim, &mut statuses);

            for (url, explanation) in claim.mismatched_assertions() {
                statuses.push(
                    ValidationStatus::new(validation_status::ASSERTION_HASHEDURI_MISMATCH)
                        .set_url(url)
                        .set_explanation(explanation),
                );
            }

            self.verify_ingredient_manifests(claim, &mut statuses);
        }

        if let Some(pc) = self.provenance_claim() {
            Self::verify_data_hash(pc, asset, &mut statuses);
        }

        for status in &statuses {
            warn!(
                "validation failure {} at {}",
                status.code(),
                status.url().unwrap_or_default()
            );
        }
        statuses
    }

    fn verify_claim_signature(claim: &Claim, statuses: &mut Vec<ValidationStatus>) {
        let sig_url = format!("{}/{}", to_manifest_uri(claim.label()), SIGNATURE);

        let claim_data = match claim.data() {
            Ok(data) => data,
            Err(e) => {
                statuses.push(ValidationStatus::from_error(&e).set_url(sig_url));
                return;
            }
        };

        if let Err(e) = verify_cose_sign1(claim.signature_val(), &claim_data) {
            statuses.push(ValidationStatus::from_error(&Error::CoseError(e)).set_url(sig_url));
        }
    }

    fn verify_ingredient_manifests(&self, claim: &Claim, statuses: &mut Vec<ValidationStatus>) {
        for assertion in claim.ingredient_assertions() {
            let url = to_assertion_uri(claim.label(), assertion.label());
            let ingredient = match Ingredient::from_assertion(assertion) {
                Ok(i) => i,
                Err(e) => {
                    statuses.push(ValidationStatus::from_error(&e).set_url(url));
                    continue;
                }
            };

            let (Some(hashed_uri), Some(label)) =
                (ingredient.c2pa_manifest.as_ref(), ingredient.active_manifest())
            else {
                continue;
            };

            let alg = hashed_uri.alg().unwrap_or(claim.alg());
            let matches = self
                .manifest_hashed_uri(label, alg)
                .map(|h| h.hash() == hashed_uri.hash());
            match matches {
                Ok(true) => (),
                Ok(false) => statuses.push(
                    ValidationStatus::new(validation_status::INGREDIENT_MANIFEST_MISMATCH)
                        .set_url(url)
                        .set_explanation(format!("manifest {label} does not match its hash")),
                ),
                Err(e) => statuses.push(
                    ValidationStatus::new(validation_status::INGREDIENT_MANIFEST_MISMATCH)
                        .set_url(url)
                        .set_explanation(e.to_string()),
                ),
            }
        }
    }

    fn verify_data_hash(
        claim: &Claim,
        asset: Option<&mut dyn CAIRead>,
        statuses: &mut Vec<ValidationStatus>,
    ) {
        let data_hash = match claim.data_hash() {
            Ok(Some(dh)) => dh,
            Ok(None) => {
                statuses.push(
                    ValidationStatus::from_error(&Error::ClaimMissingHardBinding)
                        .set_url(to_manifest_uri(claim.label())),
                );
                return;
            }
            Err(e) => {
                statuses.push(
                    ValidationStatus::from_error(&e)
                        .set_url(to_assertion_uri(claim.label(), labels::DATA_HASH)),
                );
                return;
            }
        };

        // a detached store has nothing to check the hash against
        let Some(asset) = asset else {
            debug!("no asset supplied, data hash not checked");
            return;
        };

        if let Err(e) = data_hash.verify_stream_hash(asset, Some(claim.alg())) {
            let e = match e {
                Error::HashMismatch(_) => e,
                other => Error::HashMismatch(other.to_string()),
            };
            statuses.push(
                ValidationStatus::from_error(&e)
                    .set_url(to_assertion_uri(claim.label(), labels::DATA_HASH)),
            );
        }
    }

    // Make sure the provenance claim carries a placeholder hard binding and
    // return the CBOR size the final data hash has to match.
    fn reserve_data_hash(&mut self, slots: usize) -> Result<usize> {
        let pc = self.provenance_claim_mut()?;
        if pc.data_hash_assertions().is_empty() {
            let placeholder = DataHash::placeholder(pc.alg(), slots)?;
            pc.add_assertion(&placeholder)?;
        }
        pc.data_hash_assertions()
            .first()
            .map(|a| a.data().len())
            .ok_or(Error::ClaimMissingHardBinding)
    }

    fn sign_provenance_claim(&mut self, signer: &dyn Signer, box_size: usize) -> Result<()> {
        let pc = self.provenance_claim_mut()?;
        let sig = cose_sign(signer, &pc.data()?, box_size)?;
        pc.set_signature_val(sig);
        Ok(())
    }

    /// Embed the signed store into `dest`, a copy of `source` in `format`,
    /// and return the store bytes.
    ///
    /// For formats that hold only a store (`c2pa`), the store is written to
    /// `dest` and the data hash covers the whole of `source`.
    pub fn save_to_stream(
        &mut self,
        format: &str,
        source: &mut dyn CAIRead,
        mut dest: &mut dyn CAIReadWrite,
        signer: &dyn Signer,
    ) -> Result<Vec<u8>> {
        let handler = handler_for(format)?;
        if !handler.is_embeddable() {
            let jumbf = self.sign_detached(source, signer)?;
            save_jumbf_to_stream(format, source, dest, &jumbf)?;
            return Ok(jumbf);
        }

        let reserve_size = signer.reserve_size();
        let placeholder_len = self.reserve_data_hash(EMBEDDED_EXCLUSION_SLOTS)?;
        let alg = self.provenance_claim_mut()?.alg().to_owned();

        // 1) write a store of the final size so the asset layout is known
        self.provenance_claim_mut()?
            .set_signature_val(vec![0u8; reserve_size]);
        let placeholder_jumbf = self.to_jumbf()?;
        source.rewind()?;
        save_jumbf_to_stream(format, source, dest, &placeholder_jumbf)?;

        // 2) hash the asset around the store
        let exclusion = manifest_exclusion(format, &mut dest)?;
        debug!(
            "store occupies {} bytes at offset {}",
            exclusion.length(),
            exclusion.start()
        );
        let mut dh = DataHash::new("jumbf manifest", &alg);
        dh.add_exclusion(exclusion);
        dh.gen_hash_from_stream(&mut dest)?;
        dh.pad_to_size(placeholder_len)?;
        self.provenance_claim_mut()?.update_data_hash(dh)?;

        // 3) sign and patch the store in place
        self.sign_provenance_claim(signer, reserve_size)?;
        let jumbf = self.to_jumbf()?;
        if jumbf.len() != placeholder_jumbf.len() {
            return Err(Error::ManifestSizeMismatch {
                expected: placeholder_jumbf.len(),
                actual: jumbf.len(),
            });
        }

        let composed = compose_manifest(format, &jumbf)?;
        if composed.len() != exclusion.length() {
            error!(
                "composed store is {} bytes, reserved {}",
                composed.len(),
                exclusion.length()
            );
            return Err(Error::EmbeddingError);
        }
        dest.seek(SeekFrom::Start(exclusion.start() as u64))?;
        dest.write_all(&composed)?;
        dest.flush()?;

        if get_settings_value::<bool>("verify.verify_after_sign").unwrap_or(false) {
            dest.rewind()?;
            let written = Store::load_from_stream(format, &mut dest)?;
            let asset: &mut dyn CAIRead = &mut dest;
            check_statuses(written.verify_store(Some(asset)))?;
        }

        Ok(jumbf)
    }

    /// Copy `source` to `dest` unchanged and return a signed store whose
    /// data hash covers all of `source`.
    pub fn save_no_embed(
        &mut self,
        source: &mut dyn CAIRead,
        dest: &mut dyn CAIReadWrite,
        signer: &dyn Signer,
    ) -> Result<Vec<u8>> {
        copy_stream(source, dest)?;
        let jumbf = self.sign_detached(source, signer)?;

        if get_settings_value::<bool>("verify.verify_after_sign").unwrap_or(false) {
            let written = Store::from_jumbf(&jumbf)?;
            source.rewind()?;
            check_statuses(written.verify_store(Some(&mut *source)))?;
        }
        Ok(jumbf)
    }

    // data hash over the whole source, then sign
    fn sign_detached(&mut self, source: &mut dyn CAIRead, signer: &dyn Signer) -> Result<Vec<u8>> {
        let placeholder_len = self.reserve_data_hash(EMBEDDED_EXCLUSION_SLOTS)?;
        let alg = self.provenance_claim_mut()?.alg().to_owned();

        let mut dh = DataHash::new("jumbf manifest", &alg);
        dh.gen_hash_from_stream(source)?;
        dh.pad_to_size(placeholder_len)?;
        self.provenance_claim_mut()?.update_data_hash(dh)?;

        self.sign_provenance_claim(signer, signer.reserve_size())?;
        self.to_jumbf()
    }

    /// Build a composed store for `format` with a placeholder data hash and
    /// a zeroed signature of `reserve_size` bytes.
    ///
    /// The placeholder has room for up to ten exclusions.
    pub fn get_data_hashed_manifest_placeholder(
        &mut self,
        reserve_size: usize,
        format: &str,
    ) -> Result<Vec<u8>> {
        handler_for(format)?;
        self.reserve_data_hash(DATA_HASHED_EXCLUSION_SLOTS)?;
        self.provenance_claim_mut()?
            .set_signature_val(vec![0u8; reserve_size]);

        let jumbf = self.to_jumbf()?;
        debug!(
            "data hashed placeholder: {} byte store, {reserve_size} byte signature",
            jumbf.len()
        );
        compose_manifest(format, &jumbf)
    }

    /// Sign the provenance claim with a caller supplied data hash and return
    /// the store composed for `format`.
    ///
    /// If `asset` is given the hash is computed from it using the exclusions
    /// in `data_hash`. The signature is sized to `box_size` when it fits, and
    /// to the signer's reserve size otherwise. When the composed store does
    /// not have the length of the first exclusion, the exclusion is updated
    /// and the claim signed again.
    pub fn get_data_hashed_embeddable_manifest(
        &mut self,
        data_hash: &DataHash,
        signer: &dyn Signer,
        format: &str,
        asset: Option<&mut dyn CAIRead>,
        box_size: Option<usize>,
    ) -> Result<Vec<u8>> {
        let handler = handler_for(format)?;
        let embeddable = handler.is_embeddable();
        if embeddable && data_hash.exclusions().is_empty() {
            return Err(Error::BadParam(format!(
                "a data hash for {format} must exclude the manifest"
            )));
        }

        let mut dh = data_hash.clone();
        match asset {
            Some(asset) => dh.gen_hash_from_stream(asset)?,
            None if dh.hash.is_empty() => {
                return Err(Error::BadParam(
                    "data hash has no hash value and no asset was given".to_owned(),
                ))
            }
            None => (),
        }

        let placeholder_len = self.reserve_data_hash(DATA_HASHED_EXCLUSION_SLOTS)?;
        let mut box_size = box_size.unwrap_or_else(|| signer.reserve_size());

        for pass in 0..MAX_EXCLUSION_FIXUPS {
            dh.pad_to_size(placeholder_len)?;
            self.provenance_claim_mut()?.update_data_hash(dh.clone())?;

            match self.sign_provenance_claim(signer, box_size) {
                Err(Error::CoseSigboxTooSmall) if box_size != signer.reserve_size() => {
                    debug!(
                        "signature does not fit {box_size} bytes, using reserve size {}",
                        signer.reserve_size()
                    );
                    box_size = signer.reserve_size();
                    self.sign_provenance_claim(signer, box_size)?;
                }
                result => result?,
            }

            let composed = compose_manifest(format, &self.to_jumbf()?)?;
            if !embeddable {
                return Ok(composed);
            }

            let Some(exclusion) = dh.exclusions.as_mut().and_then(|e| e.first_mut()) else {
                return Err(Error::JumbfCreationError);
            };
            if exclusion.length() == composed.len() {
                return Ok(composed);
            }

            debug!(
                "exclusion fix-up {pass}: exclusion is {} bytes, store is {}",
                exclusion.length(),
                composed.len()
            );
            exclusion.set_length(composed.len());
        }

        Err(Error::JumbfCreationError)
    }
}

// The span of the asset holding the store, merged from the handler's
// object positions.
fn manifest_exclusion(format: &str, stream: &mut dyn CAIRead) -> Result<HashRange> {
    let positions = object_locations_from_stream(format, stream)?;
    let mut cai = positions
        .iter()
        .filter(|p| p.htype == HashBlockObjectType::Cai);

    let first = cai.next().ok_or(Error::JumbfNotFound)?;
    let mut start = first.offset;
    let mut end = first.offset + first.length;
    for p in cai {
        if p.offset > end || p.offset + p.length < start {
            return Err(Error::InvalidAsset(
                "manifest store is not contiguous".to_owned(),
            ));
        }
        start = start.min(p.offset);
        end = end.max(p.offset + p.length);
    }
    Ok(HashRange::new(start, end - start))
}

fn check_statuses(statuses: Vec<ValidationStatus>) -> Result<()> {
    match statuses.first() {
        None => Ok(()),
        Some(status) => Err(Error::ClaimVerification(format!(
            "{}: {}",
            status.code(),
            status.explanation().unwrap_or_default()
        ))),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Cursor;

    use c2pa_crypto::raw_signature::SigningAlg;

    use super::*;
    use crate::{
        assertion::Assertion, utils::test_signer::test_signer, validation_status::*,
    };

    const SAMPLE_JPEG: &[u8] = include_bytes!("../tests/fixtures/sample.jpg");
    const SAMPLE_PNG: &[u8] = include_bytes!("../tests/fixtures/sample.png");

    fn test_store() -> Store {
        let mut claim = Claim::new("test/1.0", "image/jpeg", "sha256");
        claim
            .add_assertion_data(
                Assertion::from_data_json("org.test.notes", br#"{"note":"hi"}"#).unwrap(),
            )
            .unwrap();
        let mut store = Store::new();
        store.commit_claim(claim).unwrap();
        store
    }

    fn sign_into(format: &str, asset: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let signer = test_signer(SigningAlg::Es256);
        let mut store = test_store();
        let mut dest = Cursor::new(Vec::new());
        let jumbf = store
            .save_to_stream(format, &mut Cursor::new(asset), &mut dest, signer.as_ref())
            .unwrap();
        (jumbf, dest.into_inner())
    }

    #[test]
    fn test_jumbf_generation() {
        let (jumbf, signed) = sign_into("jpeg", SAMPLE_JPEG);

        let mut stream = Cursor::new(&signed);
        let store = Store::load_from_stream("image/jpeg", &mut stream).unwrap();
        assert_eq!(store.to_jumbf().unwrap(), jumbf);
        assert_eq!(store.claims().len(), 1);

        let statuses = store.verify_store(Some(&mut stream));
        assert!(statuses.is_empty(), "{statuses:?}");

        let pc = store.provenance_claim().unwrap();
        let info = Store::signature_info(pc).unwrap();
        assert_eq!(info.alg, Some(SigningAlg::Es256));
    }

    #[test]
    fn test_png_jumbf_generation() {
        let (_jumbf, signed) = sign_into("png", SAMPLE_PNG);
        let mut stream = Cursor::new(&signed);
        let store = Store::load_from_stream("png", &mut stream).unwrap();
        assert!(store.verify_store(Some(&mut stream)).is_empty());
    }

    #[test]
    fn test_modified_asset_fails_data_hash() {
        let (_jumbf, mut signed) = sign_into("jpeg", SAMPLE_JPEG);
        let last = signed.len() - 3;
        signed[last] ^= 0xff;

        let mut stream = Cursor::new(&signed);
        let store = Store::load_from_stream("jpeg", &mut stream).unwrap();
        let statuses = store.verify_store(Some(&mut stream));
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].code(), ASSERTION_DATAHASH_MISMATCH);
    }

    #[test]
    fn test_detects_bad_signature() {
        let signer = test_signer(SigningAlg::Es256);
        let mut store = test_store();

        // a valid signature over other bytes
        let sig = cose_sign(signer.as_ref(), b"some other claim", signer.reserve_size()).unwrap();
        store.provenance_claim_mut().unwrap().set_signature_val(sig);

        let statuses = store.verify_store(None);
        assert!(statuses.iter().any(|s| s.code() == CLAIM_SIGNATURE_MISMATCH
            && s.url().unwrap().ends_with("/c2pa.signature")));
    }

    #[test]
    fn test_no_embed_and_sidecar() {
        let signer = test_signer(SigningAlg::Ed25519);

        let mut store = test_store();
        let mut dest = Cursor::new(Vec::new());
        let jumbf = store
            .save_no_embed(&mut Cursor::new(SAMPLE_JPEG), &mut dest, signer.as_ref())
            .unwrap();
        assert_eq!(dest.get_ref().as_slice(), SAMPLE_JPEG);

        let detached = Store::from_jumbf(&jumbf).unwrap();
        assert!(detached
            .verify_store(Some(&mut Cursor::new(SAMPLE_JPEG)))
            .is_empty());

        let mut store = test_store();
        let mut sidecar = Cursor::new(Vec::new());
        let jumbf = store
            .save_to_stream(
                "c2pa",
                &mut Cursor::new(SAMPLE_JPEG),
                &mut sidecar,
                signer.as_ref(),
            )
            .unwrap();
        assert_eq!(sidecar.into_inner(), jumbf);
    }

    #[test]
    fn test_unsupported_type() {
        let signer = test_signer(SigningAlg::Es256);
        let mut store = test_store();
        let err = store
            .save_to_stream(
                "image/bmp",
                &mut Cursor::new(SAMPLE_JPEG),
                &mut Cursor::new(Vec::new()),
                signer.as_ref(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedType));
    }

    #[test]
    fn test_missing_hard_binding_is_reported() {
        let signer = test_signer(SigningAlg::Es256);
        let mut store = test_store();
        store
            .sign_provenance_claim(signer.as_ref(), signer.reserve_size())
            .unwrap();

        let statuses = store.verify_store(None);
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].code(), CLAIM_HARD_BINDINGS_MISSING);
    }

    #[test]
    fn test_data_hashed_flow() {
        let signer = test_signer(SigningAlg::Es256);

        let mut store = test_store();
        let placeholder = store
            .get_data_hashed_manifest_placeholder(signer.reserve_size(), "jpeg")
            .unwrap();

        // insert the placeholder right after SOI
        let mut asset = SAMPLE_JPEG[..2].to_vec();
        asset.extend_from_slice(&placeholder);
        asset.extend_from_slice(&SAMPLE_JPEG[2..]);

        let mut dh = DataHash::new("jumbf manifest", "sha256");
        dh.add_exclusion(HashRange::new(2, placeholder.len()));
        dh.gen_hash_from_stream(&mut Cursor::new(&asset)).unwrap();

        let signed = store
            .get_data_hashed_embeddable_manifest(
                &dh,
                signer.as_ref(),
                "jpeg",
                None,
                Some(signer.reserve_size()),
            )
            .unwrap();
        assert_eq!(signed.len(), placeholder.len());

        asset[2..2 + signed.len()].copy_from_slice(&signed);
        let mut stream = Cursor::new(&asset);
        let store = Store::load_from_stream("jpeg", &mut stream).unwrap();
        let statuses = store.verify_store(Some(&mut stream));
        assert!(statuses.is_empty(), "{statuses:?}");
    }

    #[test]
    fn test_data_hash_needs_exclusions() {
        let signer = test_signer(SigningAlg::Es256);
        let mut store = test_store();
        let mut dh = DataHash::new("jumbf manifest", "sha256");
        dh.set_hash(vec![0u8; 32]);

        let err = store
            .get_data_hashed_embeddable_manifest(&dh, signer.as_ref(), "png", None, None)
            .unwrap_err();
        assert!(matches!(err, Error::BadParam(_)));

        let err = store
            .get_data_hashed_embeddable_manifest(&dh, signer.as_ref(), "gif", None, None)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedType));
    }

    #[test]
    fn test_imported_claims_come_first() {
        let (jumbf, _) = sign_into("jpeg", SAMPLE_JPEG);
        let ingredient_store = Store::from_jumbf(&jumbf).unwrap();
        let ingredient_label = ingredient_store.provenance_label().unwrap().to_owned();

        let mut store = test_store();
        store.import_claims(&ingredient_store);
        store.import_claims(&ingredient_store);

        assert_eq!(store.claims().len(), 2);
        assert_eq!(store.claims()[0].label(), ingredient_label);
        assert_ne!(store.provenance_label().unwrap(), ingredient_label);

        let uri = store.manifest_hashed_uri(&ingredient_label, "sha256").unwrap();
        assert_eq!(uri.manifest_label(), Some(ingredient_label.as_str()));
    }
}
