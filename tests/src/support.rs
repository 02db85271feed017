//! Shared fixtures: a runtime harness with key management and signed-call
//! plumbing.

use base64::Engine;
use ecdsa::signature::hazmat::PrehashSigner;
use mtl_runtime::Runtime;
use mtl_store::MemoryStore;
use mtl_types::LedgerError;
use p256::pkcs8::{EncodePublicKey, LineEnding};
use sha2::{Digest, Sha512};

/// A wallet with its signing key.
pub struct Actor {
    pub address: String,
    sk: p256::ecdsa::SigningKey,
}

/// Runtime plus a controllable clock.
pub struct Harness {
    pub rt: Runtime<MemoryStore>,
    pub now: i64,
}

pub fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Sign `fields` joined by `|` the way wallet clients do: SHA-512 digest,
/// DER signature, base64.
pub fn sign(sk: &p256::ecdsa::SigningKey, fields: &[&str]) -> String {
    let digest = Sha512::digest(fields.join("|").as_bytes());
    let sig: p256::ecdsa::Signature = sk.sign_prehash(&digest).expect("sign");
    base64::engine::general_purpose::STANDARD.encode(sig.to_der().as_bytes())
}

pub fn keypair() -> (p256::ecdsa::SigningKey, String) {
    let sk = p256::ecdsa::SigningKey::random(&mut rand::thread_rng());
    let pem = sk
        .verifying_key()
        .to_public_key_pem(LineEnding::LF)
        .expect("pem encode");
    (sk, pem)
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    pub fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        Self {
            rt: Runtime::new(MemoryStore::new()),
            now: 1_700_000_000,
        }
    }

    pub fn actor(&mut self, info: &str) -> Actor {
        let (sk, pem) = keypair();
        let address = self
            .rt
            .invoke("NewWallet", &args(&[&pem, info]), self.now)
            .expect("new wallet");
        Actor { address, sk }
    }

    /// Signed call where the canonical message is exactly the call arguments.
    pub fn call(
        &mut self,
        op: &str,
        signer: &Actor,
        fields: &[&str],
    ) -> Result<String, LedgerError> {
        self.call_with_message(op, signer, fields, fields)
    }

    /// Signed call for operations whose message omits some arguments
    /// (`Transfer` drops tag and memo, for example).
    pub fn call_with_message(
        &mut self,
        op: &str,
        signer: &Actor,
        call_args: &[&str],
        message: &[&str],
    ) -> Result<String, LedgerError> {
        let tkey = self
            .rt
            .invoke("GetNonce", &args(&[&signer.address]), self.now)?;
        let mut fields: Vec<&str> = message.to_vec();
        fields.push(&tkey);
        let sig = sign(&signer.sk, &fields);
        let mut full = args(call_args);
        full.push(sig);
        full.push(tkey);
        self.rt.invoke(op, &full, self.now)
    }

    /// One `Exchange` call; both sides sign the same eight shared fields.
    #[allow(clippy::too_many_arguments)]
    pub fn exchange(
        &mut self,
        from: &Actor,
        from_amount: &str,
        from_token: &str,
        from_fee: &str,
        from_fee_addr: &str,
        to: &Actor,
        to_amount: &str,
        to_token: &str,
        to_fee: &str,
        to_fee_addr: &str,
    ) -> Result<String, LedgerError> {
        let message = [
            from.address.as_str(),
            to.address.as_str(),
            from_amount,
            from_token,
            from_fee,
            to_amount,
            to_token,
            to_fee,
        ];
        let tkey_from = self
            .rt
            .invoke("GetNonce", &args(&[&from.address]), self.now)?;
        let tkey_to = self.rt.invoke("GetNonce", &args(&[&to.address]), self.now)?;
        let mut fields_from: Vec<&str> = message.to_vec();
        fields_from.push(&tkey_from);
        let mut fields_to: Vec<&str> = message.to_vec();
        fields_to.push(&tkey_to);
        let sig_from = sign(&from.sk, &fields_from);
        let sig_to = sign(&to.sk, &fields_to);
        self.rt.invoke(
            "Exchange",
            &args(&[
                &from.address,
                from_amount,
                from_token,
                from_fee,
                from_fee_addr,
                "",
                "",
                &sig_from,
                &tkey_from,
                &to.address,
                to_amount,
                to_token,
                to_fee,
                to_fee_addr,
                "",
                "",
                &sig_to,
                &tkey_to,
            ]),
            self.now,
        )
    }

    /// Register a fungible token owned by `owner`; the supply is distributed
    /// per `reserves`.
    pub fn register_token(
        &mut self,
        owner: &Actor,
        decimal: u32,
        supply: &str,
        reserves: &[(&str, &str)],
    ) -> i64 {
        let reserve_json: Vec<String> = reserves
            .iter()
            .map(|(addr, amt)| format!(r#"{{"address":"{addr}","amount":"{amt}"}}"#))
            .collect();
        let json = format!(
            r#"{{"owner":"{}","symbol":"TST","name":"Test Token","decimal":{decimal},"totalsupply":"{supply}","reserve":[{}]}}"#,
            owner.address,
            reserve_json.join(",")
        );
        self.call("TokenRegister", owner, &[&json])
            .expect("token register")
            .parse()
            .expect("token sn")
    }

    pub fn create_project(&mut self, owner: &Actor, name: &str) -> String {
        let json = format!(r#"{{"owner":"{}","name":"{name}"}}"#, owner.address);
        self.call("Mrc400Create", owner, &[&json])
            .expect("mrc400 create")
    }

    /// Mint one item; returns its 81-char id.
    #[allow(clippy::too_many_arguments)]
    pub fn create_item(
        &mut self,
        owner: &Actor,
        project_id: &str,
        item_id: &str,
        token: i64,
        reserve: &str,
        melting_fee: &str,
        sell_fee: &str,
    ) -> String {
        let json = format!(
            r#"[{{"itemID":"{item_id}","initialtoken":{token},"initialreserve":"{reserve}","meltingfee":"{melting_fee}","sellfee":"{sell_fee}","transferable":"Permanent"}}]"#
        );
        let ids = self
            .call("Mrc401Create", owner, &[project_id, &json])
            .expect("mrc401 create");
        let mut ids: Vec<String> = serde_json::from_str(&ids).expect("item ids");
        ids.pop().expect("one item id")
    }

    /// All balance buckets of a wallet as `(token, amount, unlockDate)`.
    pub fn buckets(&mut self, address: &str) -> Vec<(i64, u64, i64)> {
        let json = self
            .rt
            .invoke("BalanceOf", &args(&[address]), self.now)
            .expect("balance of");
        let value: serde_json::Value = serde_json::from_str(&json).expect("balance json");
        value
            .as_array()
            .expect("bucket array")
            .iter()
            .map(|b| {
                (
                    b["tokenId"].as_i64().expect("tokenId"),
                    b["amount"].as_str().expect("amount").parse().expect("amount"),
                    b["unlockDate"].as_i64().expect("unlockDate"),
                )
            })
            .collect()
    }

    /// Total holdings of `token` across all buckets, locked or not.
    pub fn holdings(&mut self, address: &str, token: i64) -> u64 {
        self.buckets(address)
            .iter()
            .filter(|b| b.0 == token)
            .map(|b| b.1)
            .sum()
    }

    /// A stored record as JSON, via the read-only query `op`.
    pub fn record(&mut self, op: &str, id: &str) -> serde_json::Value {
        let json = self.rt.invoke(op, &args(&[id]), self.now).expect(op);
        serde_json::from_str(&json).expect("record json")
    }
}

/// A 40-char alphanumeric item id.
pub fn item_id40(seed: char) -> String {
    seed.to_string().repeat(40)
}
