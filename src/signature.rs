use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;

#[cfg_attr(test, mockall::automock)]
pub trait SignatureVerifier: Send + Sync {
	fn verify(&self, order_id: &str, status_code: &str, gross_amount: &str, signature: &str)
		-> bool;
}

/// SHA-512 over `order_id + status_code + gross_amount + server_key`, hex encoded.
pub struct Sha512Verifier {
	server_key: String,
}

impl Sha512Verifier {
	pub fn new(server_key: &str) -> Self {
		Self { server_key: server_key.to_string() }
	}

	pub fn sign(&self, order_id: &str, status_code: &str, gross_amount: &str) -> String {
		let mut hasher = Sha512::new();
		hasher.update(order_id.as_bytes());
		hasher.update(status_code.as_bytes());
		hasher.update(gross_amount.as_bytes());
		hasher.update(self.server_key.as_bytes());
		hex::encode(hasher.finalize())
	}
}

impl SignatureVerifier for Sha512Verifier {
	fn verify(&self, order_id: &str, status_code: &str, gross_amount: &str, signature: &str) -> bool {
		let expected = self.sign(order_id, status_code, gross_amount);
		expected.as_bytes().ct_eq(signature.as_bytes()).into()
	}
}
