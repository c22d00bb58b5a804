// Generated by `magic-gen`. Do not edit by hand.
// Regenerate with: cargo run --release -p magic-gen -- --seed 0x00c0ffee --output crates/chess-engine/src/movegen/magic_numbers.rs

/// Seed `magic-gen` produced these tables from.
pub const MAGIC_SEED: u64 = 0x00c0ffee;

/// Index width of every rook lookup table (2^12 entries per square).
pub const ROOK_INDEX_BITS: u32 = 12;

/// Index width of every bishop lookup table (2^9 entries per square).
pub const BISHOP_INDEX_BITS: u32 = 9;

#[rustfmt::skip]
pub const ROOK_MAGICS: [u64; 64] = [
    0xa180004000208110, 0x2180802000414001, 0x4c80085002142000, 0x04600480400a1020,
    0x401001080c020010, 0x2020130681000402, 0x000a002080924100, 0x0200004020820104,
    0x1400400840102001, 0x8056400010182018, 0x8006000804794010, 0x1010800880021000,
    0x0961980448281004, 0x000504140015040c, 0x4004060080090010, 0x8040c00028148340,
    0x1410024800400010, 0x0011010403002408, 0x0110c02022000820, 0x1100088002104004,
    0x0829500802284800, 0x0024004001041620, 0x1008418011003200, 0x0000014008218500,
    0x0800200060001006, 0x0205000820012111, 0x4020000820040020, 0x0010010100100814,
    0x3400208400924005, 0x0001080100020400, 0x103c1048020002a1, 0x20c4680048040108,
    0x004400e050200900, 0x8000200810400040, 0x00100c0004050040, 0x8000422122200400,
    0x080809001010082c, 0x4000009200382400, 0x0008244040100880, 0x02808012a0080040,
    0x0090402048400408, 0x4000244010100810, 0x004028001400a010, 0x4804000210001809,
    0x0282008910121004, 0x1221800600018004, 0x1000093408100128, 0x0801008940002402,
    0x01004080100a1008, 0x3080080200204248, 0x10222a3000524081, 0x9200204810000210,
    0x0044000100202220, 0x0000c80896091440, 0x0a00c00400c08820, 0x1080104300002008,
    0x1e00104080210202, 0x0206008850402282, 0x1104050020400811, 0x0822000941200402,
    0x8088000201001005, 0x0085100104009812, 0x0008005c00820021, 0x1a04940440810022,
];

#[rustfmt::skip]
pub const BISHOP_MAGICS: [u64; 64] = [
    0x0400610144104884, 0x0895006f103a0040, 0x0002011222080492, 0x0830084008020024,
    0x8220120211008880, 0x004048200f400050, 0x0e00a220d0200020, 0x8000040022003002,
    0x0000940104280100, 0x8011003002003741, 0x0000142200080b02, 0x0100020284020199,
    0x001145802c000484, 0x6200431880204004, 0x001082038040b050, 0x1100382010c82200,
    0x0414006002c08480, 0x2256000024821100, 0x0010400441501462, 0x0000204404005000,
    0x1645241004240000, 0x4200100008488801, 0x5102000020722824, 0x0700400008219000,
    0x2244400021022400, 0x0302050480831804, 0x0440100102040430, 0x00004800048200c0,
    0x90004040a4010040, 0xa0484080000c0400, 0x00211008804a0800, 0x200820e232080a00,
    0x2409411021004400, 0x0084022084424401, 0x0020804a01008020, 0x0040020080180080,
    0x2640094090010100, 0xa48c210280084440, 0x0002000a0c294019, 0x0420805600008028,
    0xa008112020025240, 0x0082009102040800, 0x4002040009800180, 0x0008000300411400,
    0x04080108c2200022, 0xc040010020886100, 0x0000a4001a0800c2, 0x8001220400124108,
    0x14802144201a1000, 0x2008504800440420, 0x0490000650440008, 0x0c05000020090800,
    0x0500132300240000, 0x0000082401401002, 0x0024a02280801103, 0x4204100822062206,
    0x0c8004481c008604, 0x0412001218850101, 0x0280000021148600, 0x300a012401a90800,
    0x0800000192960470, 0x10000020a0010040, 0x001000b034004440, 0x0640442800441480,
];
