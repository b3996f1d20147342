use esign_core::status::Status;
use esign_core::types::Signer;

/// Derive an envelope's status from the statuses of its signers.
///
/// Pure function over the signer-status multiset — the payload's own
/// envelope-level status is never trusted:
/// 1. Any declined signer forces `declined`.
/// 2. Else `completed` requires unanimity.
/// 3. Else the envelope sits at the lowest-progress status among its
///    signers along `draft < sent < delivered < completed`.
///
/// Returns `None` for an envelope with zero signers; the caller leaves
/// the envelope status unchanged.
pub fn derive_signature_status(signers: &[Signer]) -> Option<Status> {
    if signers.is_empty() {
        return None;
    }
    if signers.iter().any(|s| s.status == Status::Declined) {
        return Some(Status::Declined);
    }
    if signers.iter().all(|s| s.status == Status::Completed) {
        return Some(Status::Completed);
    }
    // No declined signers remain, so every status has a progress rank.
    signers
        .iter()
        .filter_map(|s| s.status.progress_rank().map(|rank| (rank, s.status)))
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, status)| status)
}
