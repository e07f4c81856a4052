use crate::common::MemoryBlockDevice;
use jimage::index::strings::{hash_code, HASH_MULTIPLIER};
use std::collections::HashMap;

struct Node {
    module: String,
    parent: String,
    base: String,
    extension: String,
    content: Vec<u8>,
    /// Non-zero marks the content as stored compressed
    compressed: u64,
    uncompressed: u64,
}

impl Node {
    fn full_name(&self) -> String {
        let mut name = String::new();
        if !self.module.is_empty() {
            name.push_str(&format!("/{}/", self.module));
        }
        if !self.parent.is_empty() {
            name.push_str(&format!("{}/", self.parent));
        }
        name.push_str(&self.base);
        if !self.extension.is_empty() {
            name.push_str(&format!(".{}", self.extension));
        }
        name
    }
}

/// Writes module images the way the runtime's image linker lays them out
pub struct ImageBuilder {
    nodes: Vec<Node>,
    big_endian: bool,
    version: u32,
}

impl ImageBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            big_endian: false,
            version: 1 << 16,
        }
    }

    #[allow(dead_code)]
    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    #[allow(dead_code)]
    pub fn version(mut self, major: u16, minor: u16) -> Self {
        self.version = (major as u32) << 16 | minor as u32;
        self
    }

    /// Add a resource, `path` like `java/lang/String.class`
    pub fn add(&mut self, module: &str, path: &str, content: &[u8]) -> &mut Self {
        let (parent, file) = match path.rfind('/') {
            Some(i) => (&path[..i], &path[i + 1..]),
            None => ("", path),
        };
        let (base, extension) = match file.rfind('.') {
            Some(i) => (&file[..i], &file[i + 1..]),
            None => (file, ""),
        };
        self.nodes.push(Node {
            module: module.to_string(),
            parent: parent.to_string(),
            base: base.to_string(),
            extension: extension.to_string(),
            content: content.to_vec(),
            compressed: 0,
            uncompressed: content.len() as u64,
        });
        self
    }

    /// Add a resource whose stored bytes are marked compressed
    pub fn add_compressed(&mut self, module: &str, path: &str, stored: &[u8], size: u64) -> &mut Self {
        self.add(module, path, stored);
        let node = self.nodes.last_mut().expect("just added");
        node.compressed = stored.len() as u64;
        node.uncompressed = size;
        self
    }

    /// Add a resource that declares `size` bytes while storing only `stored`
    #[allow(dead_code)]
    pub fn add_sized(&mut self, module: &str, path: &str, stored: &[u8], size: u64) -> &mut Self {
        self.add(module, path, stored);
        self.nodes.last_mut().expect("just added").uncompressed = size;
        self
    }

    /// Add the `/packages/<pkg>/<module>` and `/modules/<module>/<pkg>` directory nodes
    pub fn add_directory_nodes(&mut self, module: &str, package: &str) -> &mut Self {
        for (kind, parent, base) in [
            ("packages", package.replace('/', "."), module.to_string()),
            ("modules", module.to_string(), package.to_string()),
        ] {
            self.nodes.push(Node {
                module: kind.to_string(),
                parent,
                base,
                extension: String::new(),
                content: Vec::new(),
                compressed: 0,
                uncompressed: 0,
            });
        }
        self
    }

    pub fn build(&self) -> Vec<u8> {
        // Strings: offset 0 is the empty string
        let mut strings = vec![0u8];
        let mut string_offsets: HashMap<String, u64> = HashMap::new();
        let mut intern = |s: &str, strings: &mut Vec<u8>| -> u64 {
            if s.is_empty() {
                return 0;
            }
            *string_offsets.entry(s.to_string()).or_insert_with(|| {
                let offset = strings.len() as u64;
                strings.extend_from_slice(s.as_bytes());
                strings.push(0);
                offset
            })
        };

        // Locations and content
        let mut locations = Vec::new();
        let mut location_offsets = Vec::new();
        let mut content = Vec::new();
        for node in &self.nodes {
            let attrs = [
                (1u8, intern(&node.module, &mut strings)),
                (2, intern(&node.parent, &mut strings)),
                (3, intern(&node.base, &mut strings)),
                (4, intern(&node.extension, &mut strings)),
                (5, content.len() as u64),
                (6, node.compressed),
                (7, node.uncompressed),
            ];
            location_offsets.push(locations.len() as u32);
            for (kind, value) in attrs {
                if value == 0 {
                    continue;
                }
                let bytes = value.to_be_bytes();
                let skip = bytes.iter().take_while(|&&b| b == 0).count();
                let len = 8 - skip;
                locations.push(kind << 3 | (len as u8 - 1));
                locations.extend_from_slice(&bytes[skip..]);
            }
            locations.push(0);
            content.extend_from_slice(&node.content);
        }

        let names: Vec<String> = self.nodes.iter().map(Node::full_name).collect();
        let (redirect, slots) = perfect_hash(&names);
        let offsets: Vec<u32> = slots.iter().map(|&i| location_offsets[i]).collect();

        let mut image = Vec::new();
        let word = |image: &mut Vec<u8>, v: u32| {
            if self.big_endian {
                image.extend_from_slice(&v.to_be_bytes());
            } else {
                image.extend_from_slice(&v.to_le_bytes());
            }
        };
        word(&mut image, 0xCAFE_DADA);
        word(&mut image, self.version);
        word(&mut image, 0);
        word(&mut image, self.nodes.len() as u32);
        word(&mut image, names.len() as u32);
        word(&mut image, locations.len() as u32);
        word(&mut image, strings.len() as u32);
        for r in &redirect {
            word(&mut image, *r as u32);
        }
        for o in &offsets {
            word(&mut image, *o);
        }
        image.extend_from_slice(&locations);
        image.extend_from_slice(&strings);
        image.extend_from_slice(&content);
        image
    }

    pub fn device(&self) -> MemoryBlockDevice {
        MemoryBlockDevice::new(self.build())
    }
}

/// Byte offset of the location attribute stream in a little-endian image
pub fn locations_offset(image: &[u8]) -> usize {
    let table_length = u32::from_le_bytes(image[16..20].try_into().unwrap()) as usize;
    28 + table_length * 8
}

/// Redirect table plus, per slot, the index of the name stored there
fn perfect_hash(names: &[String]) -> (Vec<i32>, Vec<usize>) {
    let count = names.len();
    let mut redirect = vec![0i32; count];
    let mut slots: Vec<Option<usize>> = vec![None; count];
    if count == 0 {
        return (redirect, Vec::new());
    }

    let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (i, name) in names.iter().enumerate() {
        buckets[hash_code(name, HASH_MULTIPLIER) as usize % count].push(i);
    }
    let mut order: Vec<usize> = (0..count).filter(|&b| !buckets[b].is_empty()).collect();
    order.sort_by_key(|&b| std::cmp::Reverse(buckets[b].len()));

    for bucket in order {
        let members = &buckets[bucket];
        if members.len() == 1 {
            let free = slots.iter().position(Option::is_none).expect("free slot");
            slots[free] = Some(members[0]);
            redirect[bucket] = -1 - free as i32;
            continue;
        }

        'seed: for seed in 1..i32::MAX {
            let mut chosen = Vec::new();
            for &member in members {
                let slot = hash_code(&names[member], seed) as usize % count;
                if slots[slot].is_some() || chosen.contains(&slot) {
                    continue 'seed;
                }
                chosen.push(slot);
            }
            for (&member, &slot) in members.iter().zip(&chosen) {
                slots[slot] = Some(member);
            }
            redirect[bucket] = seed;
            break;
        }
    }

    (redirect, slots.into_iter().map(|s| s.expect("every slot filled")).collect())
}
