// Minimal well-known-binary reader for polygonal geometries.
// Accepts ISO (type + 1000/2000/3000) and EWKB (flag bits) Z/M variants;
// extra ordinates are read and dropped.

use geo::{Coord, LineString, MultiPolygon, Polygon};

const WKB_POLYGON: u32 = 3;
const WKB_MULTIPOLYGON: u32 = 6;

const EWKB_Z: u32 = 0x8000_0000;
const EWKB_M: u32 = 0x4000_0000;
const EWKB_SRID: u32 = 0x2000_0000;

/// Decode a Polygon or MultiPolygon; anything else is `None`.
pub fn multi_polygon_from_wkb(bytes: &[u8]) -> Option<MultiPolygon<f64>> {
    let mut reader = WkbReader { bytes, pos: 0 };
    let header = reader.header()?;
    match header.kind {
        WKB_POLYGON => reader
            .polygon_body(&header)
            .map(|polygon| MultiPolygon::new(vec![polygon])),
        WKB_MULTIPOLYGON => {
            let count = reader.u32(header.little_endian)?;
            let polygons = (0..count)
                .map(|_| {
                    let inner = reader.header()?;
                    if inner.kind != WKB_POLYGON {
                        return None;
                    }
                    reader.polygon_body(&inner)
                })
                .collect::<Option<Vec<_>>>()?;
            Some(MultiPolygon::new(polygons))
        }
        _ => None,
    }
}

struct Header {
    little_endian: bool,
    kind: u32,
    /// Ordinates per point
    dims: usize,
}

struct WkbReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl WkbReader<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let chunk = self.bytes.get(self.pos..self.pos + N)?;
        self.pos += N;
        chunk.try_into().ok()
    }

    fn u32(&mut self, little_endian: bool) -> Option<u32> {
        let raw = self.take::<4>()?;
        Some(if little_endian {
            u32::from_le_bytes(raw)
        } else {
            u32::from_be_bytes(raw)
        })
    }

    fn f64(&mut self, little_endian: bool) -> Option<f64> {
        let raw = self.take::<8>()?;
        Some(if little_endian {
            f64::from_le_bytes(raw)
        } else {
            f64::from_be_bytes(raw)
        })
    }

    fn header(&mut self) -> Option<Header> {
        let little_endian = match self.take::<1>()? {
            [0] => false,
            [1] => true,
            _ => return None,
        };
        let raw = self.u32(little_endian)?;
        if raw & EWKB_SRID != 0 {
            self.u32(little_endian)?;
        }

        let flags = usize::from(raw & EWKB_Z != 0) + usize::from(raw & EWKB_M != 0);
        let base = raw & 0x0FFF_FFFF;
        let (kind, iso) = (base % 1000, base / 1000);
        let extra = match iso {
            0 => flags,
            1 | 2 => 1,
            3 => 2,
            _ => return None,
        };
        Some(Header {
            little_endian,
            kind,
            dims: 2 + extra,
        })
    }

    fn polygon_body(&mut self, header: &Header) -> Option<Polygon<f64>> {
        let rings = self.u32(header.little_endian)?;
        let mut rings = (0..rings)
            .map(|_| self.ring(header))
            .collect::<Option<Vec<_>>>()?
            .into_iter();
        let exterior = rings.next()?;
        Some(Polygon::new(exterior, rings.collect()))
    }

    fn ring(&mut self, header: &Header) -> Option<LineString<f64>> {
        let points = self.u32(header.little_endian)?;
        // Reject point counts the buffer cannot hold
        let remaining = self.bytes.len().saturating_sub(self.pos);
        if (points as usize).saturating_mul(8 * header.dims) > remaining {
            return None;
        }
        (0..points)
            .map(|_| {
                let x = self.f64(header.little_endian)?;
                let y = self.f64(header.little_endian)?;
                for _ in 2..header.dims {
                    self.f64(header.little_endian)?;
                }
                Some(Coord { x, y })
            })
            .collect::<Option<Vec<_>>>()
            .map(LineString::new)
    }
}
