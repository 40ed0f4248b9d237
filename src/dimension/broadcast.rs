//! Shape broadcasting.

use crate::error::{Result, ViewError};

/// Widens `out` so that `shape` broadcasts to it.
///
/// The two shapes are aligned on their trailing axes; a length-1 axis on
/// either side stretches to the other's length. `out` grows to the larger
/// rank. Returns `true` when broadcasting is trivial, i.e. the widened
/// `out` equals `shape` modulo leading axes.
///
/// # Errors
///
/// Returns `BroadcastError` when some aligned pair of lengths differs and
/// neither is 1.
pub fn broadcast_shapes(shape: &[usize], out: &mut Vec<usize>) -> Result<bool> {
    if out.len() < shape.len() {
        let grow = shape.len() - out.len();
        out.splice(0..0, std::iter::repeat(1).take(grow));
    }
    let skip = out.len() - shape.len();
    for (k, &len) in shape.iter().enumerate() {
        let dst = &mut out[skip + k];
        if *dst == 1 {
            *dst = len;
        } else if len != 1 && len != *dst {
            return Err(ViewError::BroadcastError(shape.to_vec(), out.clone()));
        }
    }
    Ok(out[skip..] == *shape)
}

/// Checks that `from` can broadcast onto `to` without widening `to`.
pub fn can_broadcast_to(from: &[usize], to: &[usize]) -> bool {
    if from.len() > to.len() {
        return false;
    }
    let skip = to.len() - from.len();
    from.iter()
        .zip(to[skip..].iter())
        .all(|(&f, &t)| f == 1 || f == t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_widens() {
        let mut out = vec![2, 1, 4];
        let trivial = broadcast_shapes(&[3, 1], &mut out).unwrap();
        assert_eq!(out, vec![2, 3, 4]);
        assert!(!trivial);
    }

    #[test]
    fn test_broadcast_trivial() {
        let mut out = vec![2, 3];
        assert!(broadcast_shapes(&[2, 3], &mut out).unwrap());
        let mut out = vec![];
        assert!(broadcast_shapes(&[], &mut out).unwrap());
    }

    #[test]
    fn test_broadcast_trivial_modulo_leading_ones() {
        // Leading output axes do not make the broadcast non-trivial.
        let mut out = vec![1, 2, 3];
        assert!(broadcast_shapes(&[2, 3], &mut out).unwrap());
        assert_eq!(out, vec![1, 2, 3]);
        let mut out = vec![2, 3];
        assert!(broadcast_shapes(&[], &mut out).unwrap());
        // A stretched input axis does.
        let mut out = vec![2, 3];
        assert!(!broadcast_shapes(&[1, 3], &mut out).unwrap());
    }

    #[test]
    fn test_broadcast_grows_rank() {
        let mut out = vec![4];
        broadcast_shapes(&[2, 3, 4], &mut out).unwrap();
        assert_eq!(out, vec![2, 3, 4]);
    }

    #[test]
    fn test_broadcast_mismatch() {
        let mut out = vec![2, 3];
        assert!(broadcast_shapes(&[2, 4], &mut out).is_err());
    }

    #[test]
    fn test_can_broadcast_to() {
        assert!(can_broadcast_to(&[3, 1], &[2, 3, 4]));
        assert!(can_broadcast_to(&[], &[2, 3]));
        assert!(!can_broadcast_to(&[2, 3], &[3]));
        assert!(!can_broadcast_to(&[5], &[2, 4]));
    }
}
